//! Request, options and report types of a copy run

use crate::resolver::ConflictPolicy;
use std::sync::Arc;
use std::time::Duration;
use treecp_config::CopyConfig;
use treecp_io::{FileSystemRegistry, LocalFileSystem, Location};
use treecp_types::{
    BufferSize, ExitStatus, FileSystem, ParallelDepth, Result, Summary, ThreadCount,
};
use uuid::Uuid;

/// Unique identifier of a copy run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to copy: a source location and a destination root
#[derive(Debug, Clone)]
pub struct CopyRequest {
    /// Source tree or file
    pub source: Location,
    /// Destination root
    pub destination: Location,
}

impl CopyRequest {
    /// Create a request from two resolved locations
    pub fn new(source: Location, destination: Location) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Create a request between two paths on the local filesystem
    pub fn local<S: Into<std::path::PathBuf>, D: Into<std::path::PathBuf>>(
        source: S,
        destination: D,
    ) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
        Self {
            source: Location {
                fs: fs.clone(),
                path: source.into(),
            },
            destination: Location {
                fs,
                path: destination.into(),
            },
        }
    }

    /// Resolve source and destination URIs through a registry
    pub fn from_uris(
        registry: &FileSystemRegistry,
        source: &str,
        destination: &str,
    ) -> Result<Self> {
        Ok(Self::new(registry.resolve(source)?, registry.resolve(destination)?))
    }
}

/// Tuning and policy of a copy run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyOptions {
    /// Number of concurrent copy workers
    pub threads: ThreadCount,
    /// Depth below which directory listings fan out
    pub parallel_depth: ParallelDepth,
    /// Transfer buffer size per worker
    pub buffer_size: BufferSize,
    /// Conflict policy applied to every unit
    pub policy: ConflictPolicy,
}

impl CopyOptions {
    /// Create copy options from the loaded configuration
    pub fn from_config(config: &CopyConfig) -> Self {
        Self {
            threads: config.threads,
            parallel_depth: config.parallel_depth,
            buffer_size: config.buffer_size,
            policy: ConflictPolicy {
                overwrite: config.overwrite,
                ignore_failures: config.ignore_failures,
            },
        }
    }

    /// Set the number of workers
    #[must_use]
    pub fn with_threads(mut self, threads: ThreadCount) -> Self {
        self.threads = threads;
        self
    }

    /// Set the fan-out depth
    #[must_use]
    pub fn with_parallel_depth(mut self, depth: ParallelDepth) -> Self {
        self.parallel_depth = depth;
        self
    }

    /// Set the transfer buffer size
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Replace existing destination files
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.policy.overwrite = overwrite;
        self
    }

    /// Turn destination conflicts into skips
    #[must_use]
    pub fn with_ignore_failures(mut self, ignore_failures: bool) -> Self {
        self.policy.ignore_failures = ignore_failures;
        self
    }
}

/// Final report of a completed copy run
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// Run identifier
    pub run_id: RunId,
    /// Aggregated outcome of every unit
    pub summary: Summary,
    /// Number of units produced by enumeration
    pub units_enumerated: u64,
    /// Number of directory listings that ran as concurrent traversals
    pub parallel_listings: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl CopyReport {
    /// Process exit status for this run
    pub fn exit_status(&self) -> ExitStatus {
        self.summary.exit_status()
    }

    /// Whether every unit was copied or skipped and every directory was listed
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Average throughput in bytes per second
    pub fn throughput(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds > 0.0 {
            self.summary.bytes_copied as f64 / seconds
        } else {
            0.0
        }
    }
}
