//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Everything a configured provider hands to its resources
pub struct GalaxyProviderData {
    pub client: Arc<Client>,
    /// One lock per parent role; grant list edits hold it across the
    /// whole read-modify-write cycle
    grant_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GalaxyProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            grant_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serializes grant list mutations on `role_id`
    pub async fn lock_role_grants(&self, role_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.grant_locks.lock().await;
            // only the map holds an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(role_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked_roles(&self) -> usize {
        self.grant_locks.lock().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn data() -> GalaxyProviderData {
        GalaxyProviderData::new(Client::new("galaxy.example.com", "id", "secret").unwrap())
    }

    #[tokio::test]
    async fn same_role_is_serialized() {
        let data = Arc::new(data());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let data = data.clone();
                let active = active.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let _guard = data.lock_role_grants("r-1").await;
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_roles_do_not_block_each_other() {
        let data = data();
        let _first = data.lock_role_grants("r-1").await;
        let second = tokio::time::timeout(
            Duration::from_millis(100),
            data.lock_role_grants("r-2"),
        )
        .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let data = data();
        drop(data.lock_role_grants("r-1").await);
        let held = data.lock_role_grants("r-2").await;
        assert_eq!(data.tracked_roles().await, 1);

        let _other = data.lock_role_grants("r-3").await;
        assert_eq!(data.tracked_roles().await, 2);
        drop(held);
    }
}
