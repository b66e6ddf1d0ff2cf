//! Core traits for treecp operations
//!
//! `FileSystem` is the capability set every storage backend implements. The copy engine
//! is written against this trait only and never sees a concrete backend. Implementations
//! are shared between all workers of a run, so they must be safe for concurrent use.

use crate::{CopyOutcome, CopyUnit, DirEntry, FileStatus, Result, Summary};
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

/// Readable byte stream returned by [`FileSystem::open`]
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Writable byte sink returned by [`FileSystem::create`]
///
/// Data is only guaranteed to be visible once the sink has been shut down.
pub type ByteSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Capability set of a storage backend
#[async_trait]
pub trait FileSystem: Send + Sync + Debug {
    /// URI scheme this backend is registered under
    fn scheme(&self) -> &str;

    /// Status of a path, or `None` if nothing exists there
    async fn status(&self, path: &Path) -> Result<Option<FileStatus>>;

    /// Check whether anything exists at `path`
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.status(path).await?.is_some())
    }

    /// Check whether `path` is an existing directory
    async fn is_directory(&self, path: &Path) -> Result<bool> {
        Ok(self.status(path).await?.is_some_and(|status| status.is_dir()))
    }

    /// List the direct children of a directory
    async fn list(&self, dir: &Path) -> Result<Vec<DirEntry>>;

    /// Open a file for reading
    async fn open(&self, path: &Path) -> Result<ByteStream>;

    /// Create (or truncate) a file for writing
    async fn create(&self, path: &Path) -> Result<ByteSink>;

    /// Create a directory and all of its missing ancestors
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Delete a path, returning `false` if it did not exist
    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool>;
}

/// Trait for observing the progress of a copy run
pub trait ProgressReporter: Send + Sync {
    /// A unit was produced by enumeration
    fn report_unit_discovered(&self, unit: &CopyUnit);

    /// A worker finished processing a unit
    fn report_outcome(&self, outcome: &CopyOutcome);

    /// The run completed
    fn report_completion(&self, summary: &Summary);
}
