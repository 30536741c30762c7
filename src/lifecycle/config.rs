//! Engine configuration (env-driven).

use super::EngineError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Bound of every actor mailbox.
    pub mailbox_capacity: usize,

    /// Per-call timeout on post requests and on the post actor's own lookups.
    pub request_timeout: Duration,

    /// Snapshot file of the document store. `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,

    /// Feed size used when a caller does not ask for one.
    pub feed_limit: usize,

    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 32,
            request_timeout: Duration::from_millis(5000),
            store_path: None,
            feed_limit: 50,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let mailbox_capacity: usize = lookup("KARMA_MAILBOX_CAPACITY")
            .map(|v| v.parse())
            .transpose()
            .context("KARMA_MAILBOX_CAPACITY must be a positive integer.")?
            .unwrap_or(defaults.mailbox_capacity);

        let request_timeout = lookup("KARMA_REQUEST_TIMEOUT_MS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("KARMA_REQUEST_TIMEOUT_MS must be an integer (milliseconds).")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);

        let store_path = lookup("KARMA_STORE_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let feed_limit: usize = lookup("KARMA_FEED_LIMIT")
            .map(|v| v.parse())
            .transpose()
            .context("KARMA_FEED_LIMIT must be an integer.")?
            .unwrap_or(defaults.feed_limit);

        let log_level = lookup("KARMA_LOG_LEVEL").unwrap_or(defaults.log_level);

        let config = Self {
            mailbox_capacity,
            request_timeout,
            store_path,
            feed_limit,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.mailbox_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "mailbox capacity must be greater than zero".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(EngineError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.feed_limit, 50);
    }

    #[test]
    fn values_are_read_from_the_source() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("KARMA_MAILBOX_CAPACITY", "8"),
            ("KARMA_REQUEST_TIMEOUT_MS", "250"),
            ("KARMA_STORE_PATH", "/tmp/karma.json"),
            ("KARMA_FEED_LIMIT", "10"),
            ("KARMA_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/karma.json")));
        assert_eq!(config.feed_limit, 10);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_or_zero_values_are_rejected() {
        assert!(EngineConfig::from_lookup(lookup(&[("KARMA_FEED_LIMIT", "lots")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("KARMA_MAILBOX_CAPACITY", "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("KARMA_REQUEST_TIMEOUT_MS", "0")])).is_err());
    }
}
