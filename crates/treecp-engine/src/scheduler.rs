//! Fixed-size worker pool draining the task channel

use crate::aggregator::ResultAggregator;
use crate::resolver::{ConflictDecision, ConflictResolver};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tracing::{debug, trace};
use treecp_io::CopyExecutor;
use treecp_types::{CopyOutcome, CopyUnit, Error, ProgressReporter, Result, ThreadCount};

/// Configuration for the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerConfig {
    /// Number of concurrent workers
    pub workers: ThreadCount,
}

impl SchedulerConfig {
    /// Create a scheduler config with the given number of workers
    pub fn new(workers: ThreadCount) -> Self {
        Self { workers }
    }
}

/// Pool of workers that each resolve, copy and record one unit at a time
///
/// Units are taken from a single shared receiver, so no ordering holds between them.
/// A failing unit never stops its worker or the pool.
#[derive(Clone)]
pub struct WorkerPool {
    config: SchedulerConfig,
    resolver: Arc<ConflictResolver>,
    executor: Arc<CopyExecutor>,
    aggregator: Arc<ResultAggregator>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Create a new worker pool
    pub fn new(
        config: SchedulerConfig,
        resolver: ConflictResolver,
        executor: CopyExecutor,
        aggregator: Arc<ResultAggregator>,
    ) -> Self {
        Self {
            config,
            resolver: Arc::new(resolver),
            executor: Arc::new(executor),
            aggregator,
            reporter: None,
        }
    }

    /// Attach a progress reporter notified of every outcome
    #[must_use]
    pub fn with_reporter(mut self, reporter: Option<Arc<dyn ProgressReporter>>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run workers until the channel is closed and drained
    ///
    /// Returns once every worker has returned. An error means a worker task itself
    /// died, not that a unit failed.
    pub async fn run(&self, rx: UnboundedReceiver<CopyUnit>) -> Result<()> {
        let rx = Arc::new(Mutex::new(rx));
        let workers = self.config.workers.get();
        debug!("Starting {} copy workers", workers);

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let pool = self.clone();
                let rx = Arc::clone(&rx);
                tokio::spawn(async move { pool.work(id, rx).await })
            })
            .collect();

        let mut processed = 0usize;
        for joined in join_all(handles).await {
            processed += joined.map_err(|e| Error::other(format!("Copy worker failed: {e}")))?;
        }

        debug!("All workers finished after {} units", processed);
        Ok(())
    }

    async fn work(&self, id: usize, rx: Arc<Mutex<UnboundedReceiver<CopyUnit>>>) -> usize {
        let mut processed = 0;
        loop {
            let next = rx.lock().await.recv().await;
            let Some(unit) = next else {
                break;
            };

            let outcome = self.process(unit).await;
            self.aggregator.record(&outcome);
            if let Some(reporter) = &self.reporter {
                reporter.report_outcome(&outcome);
            }
            processed += 1;
        }

        trace!("Worker {} processed {} units", id, processed);
        processed
    }

    /// Resolve and copy one unit, producing exactly one outcome
    pub async fn process(&self, unit: CopyUnit) -> CopyOutcome {
        match self.resolver.resolve_unit(&unit).await {
            ConflictDecision::Proceed => match self.executor.copy(&unit).await {
                Ok(bytes) => CopyOutcome::copied(unit, bytes),
                Err(error) => CopyOutcome::failed(unit, error),
            },
            ConflictDecision::Skip => {
                debug!("Skipping existing destination {}", unit.destination.display());
                CopyOutcome::skipped(unit)
            }
            ConflictDecision::Fail(error) => CopyOutcome::failed(unit, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ConflictPolicy;
    use rstest::rstest;
    use std::path::Path;
    use tokio::sync::mpsc;
    use treecp_io::MemoryObjectStore;
    use treecp_types::{BufferSize, FileSystem, OutcomeStatus};

    fn pool(
        store: &MemoryObjectStore,
        workers: usize,
        policy: ConflictPolicy,
    ) -> (WorkerPool, Arc<ResultAggregator>) {
        let fs: Arc<dyn FileSystem> = Arc::new(store.clone());
        let aggregator = Arc::new(ResultAggregator::new());
        let pool = WorkerPool::new(
            SchedulerConfig::new(ThreadCount::new(workers).unwrap()),
            ConflictResolver::new(fs.clone(), policy),
            CopyExecutor::new(fs.clone(), fs, BufferSize::default()),
            Arc::clone(&aggregator),
        );
        (pool, aggregator)
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(16)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_drains_every_unit(#[case] workers: usize) {
        let store = MemoryObjectStore::new();
        let (tx, rx) = mpsc::unbounded_channel();
        for i in 0..100 {
            store.insert_file(format!("/src/f{i}"), vec![b'x'; i]);
            tx.send(CopyUnit::file(format!("/src/f{i}"), format!("/dst/f{i}"), i as u64))
                .unwrap();
        }
        drop(tx);

        let (pool, aggregator) = pool(&store, workers, ConflictPolicy::default());
        pool.run(rx).await.unwrap();

        let summary = aggregator.finalize();
        assert_eq!(summary.files_copied, 100);
        assert_eq!(summary.bytes_copied, (0..100u64).sum::<u64>());
        assert_eq!(store.read_file(Path::new("/dst/f42")).unwrap().len(), 42);
    }

    #[tokio::test]
    async fn test_process_applies_conflict_policy() {
        let store = MemoryObjectStore::new();
        store.insert_file("/src/a", "new");
        store.insert_file("/dst/a", "old");
        let unit = CopyUnit::file("/src/a", "/dst/a", 3);

        let (strict, _) = pool(&store, 1, ConflictPolicy::default());
        let outcome = strict.process(unit.clone()).await;
        assert_eq!(
            outcome.status,
            OutcomeStatus::Failed(Error::conflict("/dst/a"))
        );

        let ignoring = ConflictPolicy {
            overwrite: false,
            ignore_failures: true,
        };
        let (lenient, _) = pool(&store, 1, ignoring);
        assert_eq!(lenient.process(unit.clone()).await.status, OutcomeStatus::Skipped);
        assert_eq!(store.read_file(Path::new("/dst/a")).unwrap().as_ref(), b"old");

        let overwriting = ConflictPolicy {
            overwrite: true,
            ignore_failures: false,
        };
        let (replacing, _) = pool(&store, 1, overwriting);
        let outcome = replacing.process(unit).await;
        assert!(outcome.is_copied());
        assert_eq!(store.read_file(Path::new("/dst/a")).unwrap().as_ref(), b"new");
    }

    #[tokio::test]
    async fn test_io_failure_is_an_outcome() {
        let store = MemoryObjectStore::new();
        let (pool, aggregator) = pool(&store, 2, ConflictPolicy::default());

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(CopyUnit::file("/src/missing", "/dst/missing", 0)).unwrap();
        drop(tx);
        pool.run(rx).await.unwrap();

        let summary = aggregator.finalize();
        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(summary.failures[0].error, Error::Io { .. }));
    }
}
