//! Cluster records

use serde::{Deserialize, Serialize};

use super::common::lossless_int;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_region_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub min_workers: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub max_workers: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub idle_stop_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_link_cluster: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_cache_enabled: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub result_cache_default_visibility_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warp_resiliency_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_mode: Option<String>,
    #[serde(skip_serializing)]
    pub cluster_state: Option<String>,
    #[serde(skip_serializing)]
    pub trino_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_float_worker_counts() {
        let cluster: Cluster = serde_json::from_str(
            r#"{"clusterId":"w-1","name":"c","minWorkers":1.0,"maxWorkers":"3","clusterState":"RUNNING"}"#,
        )
        .unwrap();
        assert_eq!(cluster.min_workers, Some(1));
        assert_eq!(cluster.max_workers, Some(3));
        assert_eq!(cluster.idle_stop_minutes, None);
        assert_eq!(cluster.cluster_state.as_deref(), Some("RUNNING"));
    }

    #[test]
    fn server_owned_fields_are_not_sent() {
        let cluster = Cluster {
            name: Some("c".to_string()),
            cluster_state: Some("RUNNING".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&cluster).unwrap(),
            serde_json::json!({"name": "c"})
        );
    }
}
