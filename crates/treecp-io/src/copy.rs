//! Streaming copy of a single unit between two backends

use crate::CopyBuffer;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use treecp_types::{BufferSize, ByteSink, ByteStream, CopyUnit, Error, FileSystem, Result};

/// Executes copy units by streaming data from a source backend to a destination backend
///
/// The executor performs no conflict checks of its own: a file unit unconditionally
/// creates (or truncates) its destination.
#[derive(Debug, Clone)]
pub struct CopyExecutor {
    source: Arc<dyn FileSystem>,
    destination: Arc<dyn FileSystem>,
    buffer_size: BufferSize,
}

impl CopyExecutor {
    /// Create a new executor
    pub fn new(
        source: Arc<dyn FileSystem>,
        destination: Arc<dyn FileSystem>,
        buffer_size: BufferSize,
    ) -> Self {
        Self {
            source,
            destination,
            buffer_size,
        }
    }

    /// Buffer size used for each transfer
    pub fn buffer_size(&self) -> BufferSize {
        self.buffer_size
    }

    /// Copy one unit, returning the number of bytes written
    ///
    /// A directory unit creates the destination directory and transfers nothing. A file
    /// unit creates missing destination parents, then streams the source in chunks of at
    /// most the configured buffer size. A partially written destination is removed on a
    /// stream failure.
    pub async fn copy(&self, unit: &CopyUnit) -> Result<u64> {
        if unit.is_dir() {
            self.destination.create_dir_all(&unit.destination).await?;
            debug!("Created directory: {}", unit.destination.display());
            return Ok(0);
        }

        if let Some(parent) = unit.destination.parent() {
            if !parent.as_os_str().is_empty() {
                self.destination.create_dir_all(parent).await?;
            }
        }

        let mut reader = self.source.open(&unit.source).await?;
        let mut writer = self.destination.create(&unit.destination).await?;

        match self.stream(&mut reader, &mut writer, unit).await {
            Ok(bytes) => {
                debug!(
                    "Copied {} bytes: {} -> {}",
                    bytes,
                    unit.source.display(),
                    unit.destination.display()
                );
                Ok(bytes)
            }
            Err(error) => {
                drop(writer);
                self.remove_partial(&unit.destination).await;
                Err(error)
            }
        }
    }

    async fn stream(
        &self,
        reader: &mut ByteStream,
        writer: &mut ByteSink,
        unit: &CopyUnit,
    ) -> Result<u64> {
        let mut buffer = CopyBuffer::new(self.buffer_size);
        let mut total = 0u64;

        loop {
            let read = buffer
                .fill(reader)
                .await
                .map_err(|e| Error::io_at(&unit.source, e))?;
            if read == 0 {
                break;
            }
            let written = buffer
                .drain_into(writer)
                .await
                .map_err(|e| Error::io_at(&unit.destination, e))?;
            total += written as u64;
        }

        writer
            .shutdown()
            .await
            .map_err(|e| Error::io_at(&unit.destination, e))?;

        Ok(total)
    }

    async fn remove_partial(&self, path: &Path) {
        match self.destination.delete(path, false).await {
            Ok(true) => debug!("Removed partial file: {}", path.display()),
            Ok(false) => {}
            Err(e) => warn!("Failed to remove partial file {}: {}", path.display(), e),
        }
    }
}
