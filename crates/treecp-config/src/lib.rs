//! Configuration management for treecp
//!
//! Settings are layered: built-in defaults first, then an optional configuration file
//! (YAML, TOML or JSON), then environment variables. Command-line flags are applied on
//! top of the result by the CLI.
//!
//! # Examples
//!
//! ```rust
//! use treecp_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("treecp.yaml")
//!     .add_env_prefix("TREECP")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Workers: {}", config.copy.threads.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use treecp_types::{BufferSize, ParallelDepth, ThreadCount};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Environment variable prefix used by the default loaders
pub const ENV_PREFIX: &str = "TREECP";

/// Main configuration structure for treecp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Copy run configuration
    pub copy: CopyConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Settings of a copy run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Number of concurrent copy workers
    pub threads: ThreadCount,
    /// Directory depth below which subdirectory listings run in parallel
    pub parallel_depth: ParallelDepth,
    /// Transfer buffer size per worker
    pub buffer_size: BufferSize,
    /// Replace existing destination files
    pub overwrite: bool,
    /// Treat conflicts with existing destination files as skips
    pub ignore_failures: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            threads: ThreadCount::default(),
            parallel_depth: ParallelDepth::default(),
            buffer_size: BufferSize::default(),
            overwrite: false,
            ignore_failures: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (`trace`, `debug`, `info`, `warn` or `error`)
    pub level: String,
    /// Emit log records as JSON
    pub json_format: bool,
    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Accepted log levels
    pub const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            log_file: None,
        }
    }
}
