//! Configuration management system for DirMirror
//!
//! Configuration is layered: built-in defaults, then an optional YAML/TOML/JSON file,
//! then `DIRMIRROR__SECTION__KEY` environment variables. The merged result is
//! validated before it is handed out.
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_env_prefix("DIRMIRROR")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Polling every {} ms", config.progress.poll_interval_ms);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use dirmirror_types::TransferMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Log levels accepted by `logging.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration structure for DirMirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Replication behaviour
    pub mirror: MirrorConfig,
    /// Progress display configuration
    pub progress: ProgressConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when neither `RUST_LOG` nor a CLI flag sets one
    pub level: String,
    /// Emit JSON lines instead of human readable text
    pub json: bool,
    /// Also write logs to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Replication behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Operation applied to each missing file
    pub operation: TransferMode,
    /// Compare again after a successful replication
    pub refresh_after_replication: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            operation: TransferMode::Copy,
            refresh_after_replication: true,
        }
    }
}

/// Progress display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// How often the progress counters are polled, in milliseconds
    pub poll_interval_ms: u64,
    /// Print the diff tree before replicating
    pub show_tree: bool,
}

impl ProgressConfig {
    /// Minimum accepted polling interval
    pub const MIN_POLL_INTERVAL_MS: u64 = 10;
    /// Maximum accepted polling interval
    pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

    /// Polling interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            show_tree: true,
        }
    }
}
