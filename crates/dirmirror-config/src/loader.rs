//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DIRMIRROR";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the first default location found
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();

        if let Some(path) = Self::find_default_config() {
            builder = builder.add_source_file(path);
        }

        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Serialize configuration in the format implied by the file extension
    pub fn to_string_for<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<String> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to TOML: {}", e))
            }),
            Some("json") => serde_json::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to JSON: {}", e))
            }),
            _ => Ok(serde_yaml::to_string(config)?),
        }
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = Self::to_string_for(config, path)?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::save_to_file(&Config::default(), path)
    }

    /// First existing default configuration file
    pub fn find_default_config() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Default configuration file paths in order of preference
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for name in ["dirmirror", ".dirmirror"] {
            for ext in ["yaml", "yml", "toml"] {
                paths.push(PathBuf::from(format!("{}.{}", name, ext)));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("dirmirror");
            for ext in ["yaml", "yml", "toml"] {
                paths.push(app_dir.join(format!("config.{}", ext)));
            }
        }

        paths
    }
}
