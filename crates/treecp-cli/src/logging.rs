//! Tracing subscriber setup

use anyhow::{anyhow, Context};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};
use treecp_config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber
///
/// Logs go to stderr, as text or JSON, and optionally to the configured log file.
/// `RUST_LOG` takes precedence over `level`. The returned guard flushes the file
/// writer when dropped. Installing twice keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig, level: &str) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{level}'"))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(if config.json_format {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    });

    let guard = match &config.log_file {
        Some(path) => {
            let (layer, guard) = file_layer(path, config.json_format)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    // A subscriber may already be installed when running in-process more than once
    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();

    Ok(guard)
}

fn file_layer(path: &Path, json: bool) -> anyhow::Result<(BoxedLayer, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file path '{}' has no file name", path.display()))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory '{}'", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = if json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer().with_ansi(false).with_writer(writer).boxed()
    };

    Ok((layer, guard))
}
