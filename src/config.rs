//! Simulator configuration.

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// Default number of control events retained.
pub const DEFAULT_LOG_CAPACITY: usize = 64;

/// Default step budget for [`Simulator::run_all`](crate::Simulator::run_all).
pub const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Tunables for a [`Simulator`](crate::Simulator).
///
/// Missing fields in a config file take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum number of control events kept in the log.
    pub log_capacity: usize,
    /// Maximum instructions `run_all` executes before giving up.
    pub max_steps: u64,
    /// Maximum undo depth; `None` keeps every step.
    pub history_limit: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            max_steps: DEFAULT_MAX_STEPS,
            history_limit: None,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "max_steps": 50 }"#).unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.log_capacity, DEFAULT_LOG_CAPACITY);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_full_json() {
        let config = SimConfig::from_json(
            r#"{ "log_capacity": 8, "max_steps": 1, "history_limit": 3 }"#,
        ).unwrap();
        assert_eq!(config, SimConfig { log_capacity: 8, max_steps: 1, history_limit: Some(3) });
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(SimConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
        assert!(matches!(SimConfig::from_json_file("/nonexistent/iss.json"), Err(ConfigError::Io(_))));
    }
}
