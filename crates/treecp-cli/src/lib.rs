//! treecp - concurrent recursive tree copy
//!
//! Command-line front end of the treecp engine. [`run`] holds the whole program so the
//! exit code contract can be exercised in-process; the binary only forwards its
//! arguments and exits with the returned code.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use console::style;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use treecp_config::{Config, ConfigLoader};
use treecp_engine::{CopyOptions, CopyRequest, EngineBuilder};
use treecp_io::FileSystemRegistry;
use treecp_types::{Error, ExitStatus, ParallelDepth, Result, ThreadCount};

pub mod display;
pub mod json_output;
pub mod logging;
pub mod progress;

/// treecp - concurrent recursive tree copy
#[derive(Parser, Debug)]
#[command(
    name = "treecp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concurrent recursive tree copy",
    long_about = "treecp copies a file or a directory tree from a source location to a\n\
                  destination root. Files are copied concurrently by a fixed pool of workers\n\
                  while the source tree is still being listed."
)]
pub struct Cli {
    /// Source file or directory (plain path or file://path)
    ///
    /// The binary registers the local filesystem only; other backends such as the
    /// in-memory object store are available to library callers through
    /// `FileSystemRegistry::register`.
    #[arg(short = 's', long = "source", value_name = "SOURCE_URI")]
    pub source: Option<String>,

    /// Destination root (plain path or file://path)
    #[arg(short = 'd', long = "dest", value_name = "DEST_URI")]
    pub destination: Option<String>,

    /// Number of concurrent copy workers [default: number of CPUs]
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Directory depth below which listings run in parallel [default: 2]
    #[arg(short = 'l', long = "parallel-depth")]
    pub parallel_depth: Option<usize>,

    /// Overwrite existing destination files
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Skip, instead of failing, files whose destination already exists
    #[arg(short = 'i', long = "ignore-failures")]
    pub ignore_failures: bool,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Quiet mode - errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode - log run progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Log level requested on the command line, if any
    fn log_level_override(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("info")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Validate the value flags into overrides, without touching any file
    fn overrides(&self) -> Result<Overrides> {
        Ok(Overrides {
            threads: self
                .threads
                .map(ThreadCount::new)
                .transpose()
                .map_err(Error::usage)?,
            parallel_depth: self
                .parallel_depth
                .map(ParallelDepth::new)
                .transpose()
                .map_err(Error::usage)?,
            overwrite: self.overwrite,
            ignore_failures: self.ignore_failures,
        })
    }
}

/// Validated command-line values that take precedence over the configuration
#[derive(Debug, Clone, Copy)]
struct Overrides {
    threads: Option<ThreadCount>,
    parallel_depth: Option<ParallelDepth>,
    overwrite: bool,
    ignore_failures: bool,
}

impl Overrides {
    /// Apply on top of the loaded configuration
    fn apply(self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.copy.threads = threads;
        }
        if let Some(depth) = self.parallel_depth {
            config.copy.parallel_depth = depth;
        }
        config.copy.overwrite |= self.overwrite;
        config.copy.ignore_failures |= self.ignore_failures;
    }
}

/// Run treecp with the given command line and return the process exit code
pub async fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                    ExitStatus::Success.code()
                }
                _ => ExitStatus::Usage.code(),
            };
        }
    };

    match execute(cli).await {
        Ok(status) => status.code(),
        Err(error) => {
            display::display_error(&error.to_string());
            error.exit_status().code()
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitStatus> {
    // Locations and flag values are checked before anything touches a filesystem,
    // configuration and log files included
    let (source, destination) = match (&cli.source, &cli.destination) {
        (Some(source), Some(destination)) => (source.clone(), destination.clone()),
        (None, _) => return Err(Error::usage("missing required source (-s <source-uri>)")),
        (_, None) => {
            return Err(Error::usage(
                "missing required destination (-d <dest-uri>)",
            ))
        }
    };

    let overrides = cli.overrides()?;

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load_default()?,
    };
    overrides.apply(&mut config);

    let level = cli
        .log_level_override()
        .unwrap_or(config.logging.level.as_str())
        .to_string();
    let _log_guard = logging::init_logging(&config.logging, &level)
        .map_err(|e| Error::config(format!("failed to initialize logging: {e:#}")))?;

    info!("treecp v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = FileSystemRegistry::with_defaults();
    let request = CopyRequest::from_uris(&registry, &source, &destination)?;

    let interactive = !cli.quiet && !cli.json;
    if interactive {
        println!(
            "{} Copying {} to {}",
            style("→").green().bold(),
            style(&source).cyan(),
            style(&destination).cyan()
        );
    }

    let mut builder = EngineBuilder::new().with_options(CopyOptions::from_config(&config.copy));
    if interactive {
        builder = builder.with_reporter(Arc::new(progress::ProgressBarReporter::new()));
    }
    let engine = builder.build();

    let report = engine.execute(request).await?;

    if cli.json {
        let output = json_output::CopyResultJson::from_report(&report, &source, &destination);
        println!("{}", output.to_json_string());
    } else if !cli.quiet {
        display::print_report(&report);
    } else {
        display::print_failures(&report.summary);
    }

    Ok(report.exit_status())
}
