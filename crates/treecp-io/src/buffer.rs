//! Bounded transfer buffer

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use treecp_types::BufferSize;

/// Fixed-capacity buffer that carries one chunk at a time from a reader to a writer
///
/// The capacity never grows past the configured [`BufferSize`], so a transfer holds at
/// most one buffer worth of file data in memory regardless of the file size.
#[derive(Debug)]
pub struct CopyBuffer {
    buffer: BytesMut,
    capacity: usize,
}

impl CopyBuffer {
    /// Create a new buffer with the given capacity
    pub fn new(size: BufferSize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(size.get()),
            capacity: size.get(),
        }
    }

    /// Configured capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently held
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer holds no data
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the buffer contents with the next chunk from `reader`
    ///
    /// Returns the number of bytes read; `0` means end of stream.
    pub async fn fill<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.buffer.clear();
        (&mut *reader)
            .take(self.capacity as u64)
            .read_buf(&mut self.buffer)
            .await
    }

    /// Write the held chunk to `writer`
    pub async fn drain_into<W>(&mut self, writer: &mut W) -> std::io::Result<usize>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        writer.write_all(&self.buffer).await?;
        let written = self.buffer.len();
        self.buffer.clear();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_fill_is_bounded_by_capacity() {
        let data = vec![7u8; BufferSize::MIN * 3 + 5];
        let mut reader = Cursor::new(data.clone());
        let mut buffer = CopyBuffer::new(BufferSize::new(BufferSize::MIN).unwrap());

        let mut chunks = Vec::new();
        loop {
            let read = buffer.fill(&mut reader).await.unwrap();
            if read == 0 {
                break;
            }
            assert!(read <= BufferSize::MIN);
            chunks.push(read);
            let mut sink = Vec::new();
            buffer.drain_into(&mut sink).await.unwrap();
            assert_eq!(sink.len(), read);
        }

        assert_eq!(chunks.iter().sum::<usize>(), data.len());
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_empty_reader() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut buffer = CopyBuffer::new(BufferSize::default());
        assert_eq!(buffer.fill(&mut reader).await.unwrap(), 0);
        assert_eq!(buffer.capacity(), BufferSize::DEFAULT);
    }
}
