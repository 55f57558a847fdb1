//! Configuration builder for flexible configuration loading

use crate::{Config, ConfigError, ConfigResult, ProgressConfig, LOG_LEVELS};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Separator between nested keys in environment variable names
const ENV_SEPARATOR: &str = "__";

/// Configuration builder for loading configuration from multiple sources
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<ConfigSource>,
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, format: FileFormat },
    Defaults,
    Environment { prefix: String },
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
        }
    }

    /// Add the built-in defaults as a layer; sources added later override them
    pub fn add_defaults(mut self) -> Self {
        self.sources.push(ConfigSource::Defaults);
        self
    }

    /// Add a configuration file source; a missing file is ignored
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(ConfigSource::File { path, format });
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(ConfigSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> ConfigResult<Config> {
        for source in &self.sources {
            match source {
                ConfigSource::File { path, format } => {
                    if path.exists() {
                        self.inner = self
                            .inner
                            .add_source(File::from(path.clone()).format(*format));
                    }
                }
                ConfigSource::Environment { prefix } => {
                    self.inner = self.inner.add_source(
                        Environment::with_prefix(prefix)
                            .separator(ENV_SEPARATOR)
                            .try_parsing(true),
                    );
                }
                ConfigSource::Defaults => {
                    self.inner = self
                        .inner
                        .add_source(config::Config::try_from(&Config::default())?);
                }
            }
        }

        let config = self.inner.build()?;
        let result: Config = config.try_deserialize()?;

        Self::validate(&result)?;

        Ok(result)
    }

    /// Detect file format from extension
    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    /// Validate the configuration
    pub fn validate(config: &Config) -> ConfigResult<()> {
        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::validation(format!(
                "Unknown log level '{}', expected one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        let interval = config.progress.poll_interval_ms;
        if !(ProgressConfig::MIN_POLL_INTERVAL_MS..=ProgressConfig::MAX_POLL_INTERVAL_MS)
            .contains(&interval)
        {
            return Err(ConfigError::validation(format!(
                "Progress poll interval must be between {} and {} ms, got {}",
                ProgressConfig::MIN_POLL_INTERVAL_MS,
                ProgressConfig::MAX_POLL_INTERVAL_MS,
                interval
            )));
        }

        if let Some(file) = &config.logging.file {
            if file.file_name().is_none() {
                return Err(ConfigError::validation(format!(
                    "Log file '{}' does not name a file",
                    file.display()
                )));
            }
        }

        Ok(())
    }
}
