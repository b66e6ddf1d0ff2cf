//! Run-wide result accumulation
//!
//! Counters are plain atomics; the failure lists are the only lock-guarded state and
//! are only ever appended to. [`ResultAggregator::finalize`] is meant to be called once,
//! after every worker has returned.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::warn;
use treecp_types::{CopyOutcome, Error, Failure, OutcomeStatus, Summary};

/// Thread-safe sink for copy outcomes
#[derive(Debug, Default)]
pub struct ResultAggregator {
    files_copied: AtomicU64,
    directories_created: AtomicU64,
    bytes_copied: AtomicU64,
    files_skipped: AtomicU64,
    failures: Mutex<Vec<Failure>>,
    listing_failures: Mutex<Vec<Failure>>,
}

impl ResultAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one unit
    pub fn record(&self, outcome: &CopyOutcome) {
        match &outcome.status {
            OutcomeStatus::Copied if outcome.unit.is_dir() => {
                self.directories_created.fetch_add(1, Ordering::Relaxed);
            }
            OutcomeStatus::Copied => {
                self.files_copied.fetch_add(1, Ordering::Relaxed);
                self.bytes_copied
                    .fetch_add(outcome.bytes_transferred, Ordering::Relaxed);
            }
            OutcomeStatus::Skipped => {
                self.files_skipped.fetch_add(1, Ordering::Relaxed);
            }
            OutcomeStatus::Failed(error) => {
                warn!("Failed to copy {}: {}", outcome.unit.source.display(), error);
                self.failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(Failure::new(&outcome.unit.source, error.clone()));
            }
        }
    }

    /// Record a directory that could not be listed
    pub fn record_listing_failure(&self, path: &Path, error: Error) {
        warn!("Failed to list {}: {}", path.display(), error);
        self.listing_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Failure::new(path, error));
    }

    /// Number of unit outcomes recorded so far
    pub fn units_recorded(&self) -> u64 {
        self.files_copied.load(Ordering::Relaxed)
            + self.directories_created.load(Ordering::Relaxed)
            + self.files_skipped.load(Ordering::Relaxed)
            + self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len() as u64
    }

    /// Produce the summary of everything recorded
    pub fn finalize(&self) -> Summary {
        Summary {
            files_copied: self.files_copied.load(Ordering::Acquire),
            directories_created: self.directories_created.load(Ordering::Acquire),
            bytes_copied: self.bytes_copied.load(Ordering::Acquire),
            files_skipped: self.files_skipped.load(Ordering::Acquire),
            failures: self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            listing_failures: self
                .listing_failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
