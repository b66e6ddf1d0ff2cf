//! Local disk backend

use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use treecp_types::{
    ByteSink, ByteStream, DirEntry, EntryKind, Error, FileStatus, FileSystem, Result,
};

/// Backend for the local filesystem, registered under the `file` scheme
///
/// Symbolic links are neither followed nor copied: listing skips them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Scheme this backend is registered under
    pub const SCHEME: &'static str = "file";

    /// Create a new local filesystem backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    async fn status(&self, path: &Path) -> Result<Option<FileStatus>> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => Ok(Some(FileStatus::directory())),
            Ok(metadata) => Ok(Some(FileStatus::file(metadata.len()))),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_at(path, e)),
        }
    }

    async fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut read_dir = fs::read_dir(dir).await.map_err(|e| Error::io_at(dir, e))?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::io_at(dir, e))?
        {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| Error::io_at(&path, e))?;

            let (kind, len) = if file_type.is_dir() {
                (EntryKind::Directory, 0)
            } else if file_type.is_file() {
                let metadata = entry.metadata().await.map_err(|e| Error::io_at(&path, e))?;
                (EntryKind::File, metadata.len())
            } else {
                debug!("Skipping special file: {}", path.display());
                continue;
            };

            entries.push(DirEntry { path, kind, len });
        }

        Ok(entries)
    }

    async fn open(&self, path: &Path) -> Result<ByteStream> {
        let file = fs::File::open(path).await.map_err(|e| Error::io_at(path, e))?;
        Ok(Box::new(file))
    }

    async fn create(&self, path: &Path) -> Result<ByteSink> {
        let file = fs::File::create(path).await.map_err(|e| Error::io_at(path, e))?;
        Ok(Box::new(file))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::io_at(path, e))
    }

    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::io_at(path, e)),
        };

        let removed = if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(path).await
            } else {
                fs::remove_dir(path).await
            }
        } else {
            fs::remove_file(path).await
        };

        removed.map(|()| true).map_err(|e| Error::io_at(path, e))
    }
}
