//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult, ENV_PREFIX};
use std::path::{Path, PathBuf};

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the first default location that exists, plus environment
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();
        if let Some(path) = Self::config_exists() {
            builder = builder.add_source_file(path);
        }
        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from a specific file, plus environment
    ///
    /// Unlike the default locations, an explicitly named file must exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.is_file() {
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

    /// Save configuration to a file, choosing the format from its extension
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to TOML: {e}"))
            })?,
            Some("json") => serde_json::to_string_pretty(config).map_err(|e| {
                ConfigError::serialization(format!("Failed to serialize to JSON: {e}"))
            })?,
            _ => serde_yaml::to_string(config)?,
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write a configuration file holding the defaults
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::save_to_file(&Config::default(), path)
    }

    /// First default configuration path that exists
    pub fn config_exists() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Default configuration file paths in order of preference
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = ["treecp", ".treecp"]
            .iter()
            .flat_map(|stem| {
                ["yaml", "yml", "toml"]
                    .iter()
                    .map(move |ext| PathBuf::from(format!("{stem}.{ext}")))
            })
            .collect();

        if let Some(config_dir) = user_config_dir() {
            let treecp_dir = config_dir.join("treecp");
            paths.push(treecp_dir.join("config.yaml"));
            paths.push(treecp_dir.join("config.yml"));
            paths.push(treecp_dir.join("config.toml"));
        }

        #[cfg(unix)]
        {
            paths.push(PathBuf::from("/etc/treecp/config.yaml"));
            paths.push(PathBuf::from("/etc/treecp/config.yml"));
            paths.push(PathBuf::from("/etc/treecp/config.toml"));
        }

        paths
    }
}

fn user_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;
    use treecp_types::ThreadCount;

    #[rstest]
    #[case("saved.yaml")]
    #[case("saved.toml")]
    #[case("saved.json")]
    fn test_save_and_load(#[case] file_name: &str) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(file_name);

        let mut original = Config::default();
        original.copy.threads = ThreadCount::new(5).unwrap();
        original.copy.ignore_failures = true;
        original.logging.level = "debug".to_string();
        ConfigLoader::save_to_file(&original, &config_path).unwrap();

        let loaded = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.copy, original.copy);
        assert_eq!(loaded.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::load_from_file(temp_dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_generate_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("default.yaml");

        ConfigLoader::generate_default_config(&config_path).unwrap();
        assert!(config_path.exists());

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.copy.parallel_depth, Config::default().copy.parallel_depth);
    }

    #[test]
    fn test_default_paths_prefer_working_directory() {
        let paths = ConfigLoader::default_config_paths();
        assert_eq!(paths[0], PathBuf::from("treecp.yaml"));
        assert!(paths.contains(&PathBuf::from(".treecp.toml")));
    }
}
