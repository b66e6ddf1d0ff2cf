//! In-memory object store backend
//!
//! Objects live in a flat key space. A directory exists either as an explicit marker
//! (created by `create_dir_all`) or implicitly, as the prefix of at least one key.
//! Written data becomes visible when the sink is shut down, the way an object store
//! commits an upload.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use treecp_types::{
    ByteSink, ByteStream, DirEntry, EntryKind, Error, FileStatus, FileSystem, Result,
};

#[derive(Debug, Clone)]
enum Object {
    File(Bytes),
    Directory,
}

type ObjectMap = BTreeMap<PathBuf, Object>;

/// Object store kept entirely in memory, registered under the `mem` scheme
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<ObjectMap>>,
}

impl MemoryObjectStore {
    /// Scheme this backend is registered under
    pub const SCHEME: &'static str = "mem";

    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly, bypassing the streaming API
    pub fn insert_file<P: Into<PathBuf>, B: Into<Bytes>>(&self, path: P, data: B) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), Object::File(data.into()));
    }

    /// Contents of an object, if one exists at `path`
    pub fn read_file(&self, path: &Path) -> Option<Bytes> {
        match self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            Some(Object::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Number of stored objects, excluding directory markers
    pub fn object_count(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|object| matches!(object, Object::File(_)))
            .count()
    }

    fn descendants<'a>(
        objects: &'a ObjectMap,
        dir: &'a Path,
    ) -> impl Iterator<Item = (&'a PathBuf, &'a Object)> + 'a {
        objects
            .range::<Path, _>((Bound::Excluded(dir), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(dir))
    }

    fn lookup(objects: &ObjectMap, path: &Path) -> Option<FileStatus> {
        match objects.get(path) {
            Some(Object::File(data)) => Some(FileStatus::file(data.len() as u64)),
            Some(Object::Directory) => Some(FileStatus::directory()),
            None => Self::descendants(objects, path)
                .next()
                .map(|_| FileStatus::directory()),
        }
    }

    fn file_ancestor(objects: &ObjectMap, path: &Path) -> Option<PathBuf> {
        path.ancestors()
            .skip(1)
            .find(|ancestor| matches!(objects.get(*ancestor), Some(Object::File(_))))
            .map(Path::to_path_buf)
    }
}

#[async_trait]
impl FileSystem for MemoryObjectStore {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    async fn status(&self, path: &Path) -> Result<Option<FileStatus>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(Self::lookup(&objects, path))
    }

    async fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        match Self::lookup(&objects, dir) {
            Some(status) if status.is_dir() => {}
            Some(_) => return Err(Error::io_at(dir, "not a directory")),
            None => return Err(Error::io_at(dir, "no such directory")),
        }

        let mut children: BTreeMap<PathBuf, DirEntry> = BTreeMap::new();
        for (key, object) in Self::descendants(&objects, dir) {
            let Ok(relative) = key.strip_prefix(dir) else {
                continue;
            };
            let mut components = relative.components();
            let Some(first) = components.next() else {
                continue;
            };
            let path = dir.join(first);

            let entry = match (components.next(), object) {
                (None, Object::File(data)) => DirEntry {
                    path: path.clone(),
                    kind: EntryKind::File,
                    len: data.len() as u64,
                },
                _ => DirEntry {
                    path: path.clone(),
                    kind: EntryKind::Directory,
                    len: 0,
                },
            };

            children
                .entry(path)
                .and_modify(|existing| {
                    if entry.is_dir() {
                        *existing = entry.clone();
                    }
                })
                .or_insert_with(|| entry.clone());
        }

        Ok(children.into_values().collect())
    }

    async fn open(&self, path: &Path) -> Result<ByteStream> {
        match self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            Some(Object::File(data)) => Ok(Box::new(Cursor::new(data.clone()))),
            _ => Err(Error::io_at(path, "no such object")),
        }
    }

    async fn create(&self, path: &Path) -> Result<ByteSink> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        if Self::lookup(&objects, path).is_some_and(|status| status.is_dir()) {
            return Err(Error::io_at(path, "is a directory"));
        }
        if let Some(ancestor) = Self::file_ancestor(&objects, path) {
            return Err(Error::io_at(
                path,
                format!("parent {} is a file", ancestor.display()),
            ));
        }

        Ok(Box::new(ObjectWriter {
            objects: Arc::clone(&self.objects),
            path: path.to_path_buf(),
            data: Vec::new(),
        }))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(objects.get(path), Some(Object::File(_))) {
            return Err(Error::io_at(path, "exists and is not a directory"));
        }
        if let Some(ancestor) = Self::file_ancestor(&objects, path) {
            return Err(Error::io_at(
                path,
                format!("parent {} is a file", ancestor.display()),
            ));
        }

        objects.insert(path.to_path_buf(), Object::Directory);
        Ok(())
    }

    async fn delete(&self, path: &Path, recursive: bool) -> Result<bool> {
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        let Some(status) = Self::lookup(&objects, path) else {
            return Ok(false);
        };

        if status.is_dir() {
            let nested: Vec<PathBuf> = Self::descendants(&objects, path)
                .map(|(key, _)| key.clone())
                .collect();
            if !nested.is_empty() && !recursive {
                return Err(Error::io_at(path, "directory not empty"));
            }
            for key in nested {
                objects.remove(&key);
            }
        }

        objects.remove(path);
        Ok(true)
    }
}

/// Sink that buffers an upload and commits it on shutdown
struct ObjectWriter {
    objects: Arc<RwLock<ObjectMap>>,
    path: PathBuf,
    data: Vec<u8>,
}

impl AsyncWrite for ObjectWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        let data = Bytes::from(std::mem::take(&mut self.data));
        let path = self.path.clone();
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, Object::File(data));
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn sample_store() -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        store.insert_file("/bucket/a.txt", "alpha");
        store.insert_file("/bucket/logs/2024/jan.log", "january");
        store.insert_file("/bucket/logs/feb.log", "february");
        store
    }

    #[tokio::test]
    async fn test_prefixes_are_implied_directories() {
        let store = sample_store();

        assert!(store.is_directory(Path::new("/bucket")).await.unwrap());
        assert!(store.is_directory(Path::new("/bucket/logs/2024")).await.unwrap());
        assert_eq!(
            store.status(Path::new("/bucket/a.txt")).await.unwrap(),
            Some(FileStatus::file(5))
        );
        assert!(!store.exists(Path::new("/bucket/log")).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_returns_direct_children_once() {
        let store = sample_store();

        let entries = store.list(Path::new("/bucket")).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            names,
            vec![PathBuf::from("/bucket/a.txt"), PathBuf::from("/bucket/logs")]
        );
        assert_eq!(entries[0].kind, EntryKind::File);
        assert!(entries[1].is_dir());

        let logs = store.list(Path::new("/bucket/logs")).await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_list_file_or_missing_fails() {
        let store = sample_store();
        assert!(store.list(Path::new("/bucket/a.txt")).await.is_err());
        assert!(store.list(Path::new("/nowhere")).await.is_err());
    }

    #[tokio::test]
    async fn test_upload_visible_after_shutdown() {
        let store = MemoryObjectStore::new();
        let path = Path::new("/bucket/new.bin");

        let mut sink = store.create(path).await.unwrap();
        sink.write_all(b"chunk-1 ").await.unwrap();
        sink.write_all(b"chunk-2").await.unwrap();
        assert!(store.read_file(path).is_none());

        sink.shutdown().await.unwrap();
        assert_eq!(store.read_file(path).unwrap().as_ref(), b"chunk-1 chunk-2");

        let mut stream = store.open(path).await.unwrap();
        let mut contents = String::new();
        stream.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "chunk-1 chunk-2");
    }

    #[tokio::test]
    async fn test_create_dir_all_marks_empty_directory() {
        let store = MemoryObjectStore::new();
        let dir = Path::new("/bucket/empty");

        store.create_dir_all(dir).await.unwrap();
        assert!(store.is_directory(dir).await.unwrap());
        assert!(store.list(dir).await.unwrap().is_empty());
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_file_in_the_way() {
        let store = sample_store();

        assert!(store
            .create_dir_all(Path::new("/bucket/a.txt/inner"))
            .await
            .is_err());
        assert!(store.create(Path::new("/bucket/a.txt/inner")).await.is_err());
        assert!(store.create(Path::new("/bucket/logs")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = sample_store();

        assert!(store.delete(Path::new("/bucket/a.txt"), false).await.unwrap());
        assert!(!store.delete(Path::new("/bucket/a.txt"), false).await.unwrap());
        assert!(store.delete(Path::new("/bucket/logs"), false).await.is_err());
        assert!(store.delete(Path::new("/bucket/logs"), true).await.unwrap());
        assert_eq!(store.object_count(), 0);
    }
}
