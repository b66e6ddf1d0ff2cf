//! Configuration builder for layered configuration loading

use crate::{Config, ConfigError, ConfigResult, LoggingConfig};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Configuration builder for loading configuration from multiple sources
///
/// Sources are applied in the order they were added; later sources override earlier
/// ones. Missing files are skipped.
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<ConfigSource>,
    env_separator: String,
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, format: FileFormat },
    Defaults,
    Environment { prefix: String },
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
            env_separator: "__".to_string(),
        }
    }

    /// Add the built-in defaults as a layer at this position
    #[must_use]
    pub fn add_defaults(mut self) -> Self {
        self.sources.push(ConfigSource::Defaults);
        self
    }

    /// Add a configuration file source, detecting the format from its extension
    #[must_use]
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(ConfigSource::File { path, format });
        self
    }

    /// Add environment variable source with prefix
    ///
    /// `TREECP__COPY__THREADS=8` sets `copy.threads` with the default separator.
    #[must_use]
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(ConfigSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Set environment variable separator (default: "__")
    #[must_use]
    pub fn env_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.env_separator = separator.into();
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> ConfigResult<Config> {
        for source in &self.sources {
            match source {
                ConfigSource::Defaults => {
                    let defaults = serde_yaml::to_value(Config::default()).map_err(|e| {
                        ConfigError::serialization(format!("Failed to serialize defaults: {e}"))
                    })?;
                    self.inner = self.inner.add_source(config::Config::try_from(&defaults)?);
                }
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
                            .separator(&self.env_separator)
                            .try_parsing(true),
                    );
                }
            }
        }

        let config: Config = self.inner.build()?.try_deserialize()?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Detect file format from extension
    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    fn validate(config: &Config) -> ConfigResult<()> {
        let level = config.logging.level.to_ascii_lowercase();
        if !LoggingConfig::LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("must be one of: {}", LoggingConfig::LEVELS.join(", ")),
            ));
        }

        if let Some(log_file) = &config.logging.log_file {
            if log_file.file_name().is_none() {
                return Err(ConfigError::invalid_value(
                    "logging.log_file",
                    format!("'{}' does not name a file", log_file.display()),
                ));
            }
        }

        Ok(())
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
