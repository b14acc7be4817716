//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default cap on frames recorded by a live stack walk.
pub const DEFAULT_STACK_SIZE: usize = 32;

/// Error loading a [`RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text is not valid JSON for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of the execution-support layer.
///
/// Missing keys fall back to their defaults, so a partial JSON document is
/// a valid configuration.
///
/// # Examples
///
/// ```
/// use core_types::RuntimeConfig;
///
/// let config = RuntimeConfig::from_json_str(r#"{ "max_stack_depth": 8 }"#).unwrap();
/// assert_eq!(config.max_stack_depth, 8);
/// assert!(config.enable_management);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Record blocked-on object and blocked count for contended monitors
    pub enable_management: bool,
    /// Maximum number of frames a live stack walk records
    pub max_stack_depth: usize,
    /// Version of the hosted class library
    pub java_version: u32,
    /// Feed the implicit-exception profile on the first fault per site
    pub implicit_exception_profiling: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            enable_management: true,
            max_stack_depth: DEFAULT_STACK_SIZE,
            java_version: 11,
            implicit_exception_profiling: true,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Boolean array stores are masked and the throwable depth is tracked
    /// from version 9 on.
    pub fn java9_or_later(&self) -> bool {
        self.java_version >= 9
    }
}
