//! Copy engine orchestration

use crate::aggregator::ResultAggregator;
use crate::enumerator::PathEnumerator;
use crate::resolver::ConflictResolver;
use crate::scheduler::{SchedulerConfig, WorkerPool};
use crate::task::{CopyOptions, CopyReport, CopyRequest, RunId};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};
use treecp_config::Config;
use treecp_io::CopyExecutor;
use treecp_types::{Error, ProgressReporter, Result};

/// Runs copy requests: enumeration, the worker pool and aggregation wired together
#[derive(Clone, Default)]
pub struct CopyEngine {
    options: CopyOptions,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for CopyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyEngine")
            .field("options", &self.options)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

impl CopyEngine {
    /// Create a new copy engine with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self {
            options,
            reporter: None,
        }
    }

    /// Create a new copy engine from a loaded configuration
    pub fn with_config(config: &Config) -> Self {
        Self::new(CopyOptions::from_config(&config.copy))
    }

    /// Options applied to every run
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute a copy request to completion
    ///
    /// Returns an error only when the run cannot start, for instance when the source
    /// does not exist. Per-unit failures are reported in the returned summary.
    pub async fn execute(&self, request: CopyRequest) -> Result<CopyReport> {
        let run_id = RunId::new();
        let span = info_span!("copy_run", run_id = %run_id);
        self.run(run_id, request).instrument(span).await
    }

    async fn run(&self, run_id: RunId, request: CopyRequest) -> Result<CopyReport> {
        let started = Instant::now();
        let CopyRequest {
            source,
            destination,
        } = request;

        info!(
            "Copying {}://{} to {}://{} with {} workers",
            source.fs.scheme(),
            source.path.display(),
            destination.fs.scheme(),
            destination.path.display(),
            self.options.threads.get()
        );

        let root = source
            .fs
            .status(&source.path)
            .await?
            .ok_or_else(|| Error::source_not_found(source.path.clone()))?;

        let aggregator = Arc::new(ResultAggregator::new());
        let enumerator = Arc::new(
            PathEnumerator::new(
                Arc::clone(&source.fs),
                source.path.clone(),
                Arc::clone(&destination.fs),
                destination.path.clone(),
                self.options.parallel_depth,
                Arc::clone(&aggregator),
            )
            .with_reporter(self.reporter.clone()),
        );
        let pool = WorkerPool::new(
            SchedulerConfig::new(self.options.threads),
            ConflictResolver::new(Arc::clone(&destination.fs), self.options.policy),
            CopyExecutor::new(
                Arc::clone(&source.fs),
                Arc::clone(&destination.fs),
                self.options.buffer_size,
            ),
            Arc::clone(&aggregator),
        )
        .with_reporter(self.reporter.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let enumeration = tokio::spawn(
            Arc::clone(&enumerator)
                .enumerate(root, tx)
                .in_current_span(),
        );

        pool.run(rx).await?;
        if let Err(e) = enumeration.await {
            aggregator.record_listing_failure(
                &source.path,
                Error::other(format!("Enumeration task failed: {e}")),
            );
        }

        let summary = aggregator.finalize();
        if let Some(reporter) = &self.reporter {
            reporter.report_completion(&summary);
        }

        let report = CopyReport {
            run_id,
            units_enumerated: enumerator.units_enumerated(),
            parallel_listings: enumerator.parallel_listings(),
            duration: started.elapsed(),
            summary,
        };

        info!(
            "Copy finished: {} files, {} directories, {} bytes, {} skipped, {} failures in {:?}",
            report.summary.files_copied,
            report.summary.directories_created,
            report.summary.bytes_copied,
            report.summary.files_skipped,
            report.summary.failure_count(),
            report.duration
        );

        Ok(report)
    }
}

/// Builder for creating a copy engine
#[derive(Default)]
pub struct EngineBuilder {
    options: CopyOptions,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl EngineBuilder {
    /// Create a new engine builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Take options from a loaded configuration
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.options = CopyOptions::from_config(&config.copy);
        self
    }

    /// Set the copy options
    #[must_use]
    pub fn with_options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Build the copy engine
    pub fn build(self) -> CopyEngine {
        CopyEngine {
            options: self.options,
            reporter: self.reporter,
        }
    }
}
