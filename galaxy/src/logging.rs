//! Diagnostic logging to stderr
//!
//! Stdout belongs to the plugin handshake, so everything goes to stderr.
//! The filter is read from `GALAXY_LOG` using `EnvFilter` syntax, e.g.
//! `GALAXY_LOG=galaxy=debug,tfplug=trace`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GALAXY_LOG";

/// Installs the global subscriber. Calling it again is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialised twice without panicking");
    }
}
