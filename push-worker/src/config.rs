//! Worker cycle configuration.

use std::env;
use std::time::Duration;

const DEFAULT_PENDING_BATCH: usize = 100;
const DEFAULT_RETRY_BATCH: usize = 50;
const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_CYCLE_INTERVAL_SECONDS: u64 = 30;

/// Tunables for one worker cycle: environment overrides layered on documented defaults.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum ready jobs processed per cycle.
    pub pending_batch: usize,
    /// Maximum retry-eligible jobs processed per cycle.
    pub retry_batch: usize,
    /// Attempts permitted before a job stops being retry-eligible.
    pub max_retries: u32,
    /// Sleep between cycles.
    pub cycle_interval: Duration,
}

impl WorkerConfig {
    /// Reads overrides from `PUSH_WORKER_PENDING_BATCH`, `PUSH_WORKER_RETRY_BATCH`,
    /// `PUSH_WORKER_MAX_RETRIES`, and `PUSH_WORKER_CYCLE_INTERVAL_SECONDS`, falling back to
    /// documented defaults for any unset or unparsable variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            pending_batch: env_or("PUSH_WORKER_PENDING_BATCH", DEFAULT_PENDING_BATCH),
            retry_batch: env_or("PUSH_WORKER_RETRY_BATCH", DEFAULT_RETRY_BATCH),
            max_retries: env_or("PUSH_WORKER_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            cycle_interval: Duration::from_secs(env_or(
                "PUSH_WORKER_CYCLE_INTERVAL_SECONDS",
                DEFAULT_CYCLE_INTERVAL_SECONDS,
            )),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_when_unset() {
        for key in [
            "PUSH_WORKER_PENDING_BATCH",
            "PUSH_WORKER_RETRY_BATCH",
            "PUSH_WORKER_MAX_RETRIES",
            "PUSH_WORKER_CYCLE_INTERVAL_SECONDS",
        ] {
            std::env::remove_var(key);
        }
        let config = WorkerConfig::from_env();
        assert_eq!(config.pending_batch, DEFAULT_PENDING_BATCH);
        assert_eq!(config.retry_batch, DEFAULT_RETRY_BATCH);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.cycle_interval, Duration::from_secs(DEFAULT_CYCLE_INTERVAL_SECONDS));
    }

    #[test]
    #[serial]
    fn reads_overrides() {
        std::env::set_var("PUSH_WORKER_PENDING_BATCH", "10");
        let config = WorkerConfig::from_env();
        assert_eq!(config.pending_batch, 10);
        std::env::remove_var("PUSH_WORKER_PENDING_BATCH");
    }
}
