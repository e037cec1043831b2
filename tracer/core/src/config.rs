//! TOML Configuration File Support
//!
//! Runner configuration with optional loading from a TOML file at
//! `~/.config/stepwise/config.toml` (XDG base directory compliant).
//!
//! This crate reads no environment variables: the service base address and
//! every tunable below are the embedding application's concern, supplied
//! either programmatically or through the config file.
//!
//! # Example Configuration
//!
//! ```toml
//! base_url = "http://localhost:5000"
//! poll_interval_ms = 1000
//! request_timeout_secs = 30
//! debug_default = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Runner configuration
///
/// Durations are stored in integer wire units so the struct round-trips
/// through TOML; use [`RunnerConfig::poll_interval`] and
/// [`RunnerConfig::request_timeout`] for the typed values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the execution service
    pub base_url: String,
    /// Delay between status queries, in milliseconds
    pub poll_interval_ms: u64,
    /// Per-request HTTP timeout, in seconds
    pub request_timeout_secs: u64,
    /// Whether runs request the service's debug handler by default
    pub debug_default: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 30,
            debug_default: false,
        }
    }
}

impl RunnerConfig {
    /// Delay between status queries
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-request HTTP timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load configuration from a TOML file
    ///
    /// Missing keys fall back to their defaults; a missing or unreadable
    /// file is an error, so callers can distinguish "no config" from
    /// "broken config" and fall back to [`RunnerConfig::default`]
    /// deliberately.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default XDG config file location
    ///
    /// `$XDG_CONFIG_HOME/stepwise/config.toml`, typically
    /// `~/.config/stepwise/config.toml`. `None` when the platform has no
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepwise").join("config.toml"))
    }
}
