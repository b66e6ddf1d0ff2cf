//! Source tree enumeration
//!
//! Each directory is listed exactly once. Its files become copy units right away. Its
//! subdirectories are either handed to new concurrent traversals, when the directory
//! sits above the configured parallel depth, or walked inline by the traversal that
//! listed it. A traversal holds a clone of the task channel sender for as long as it
//! runs, so the channel closes exactly when the last traversal finishes. Fanned-out
//! traversals are joined by their parent; one that dies is recorded as a listing
//! failure of the subdirectory it was handed.

use crate::aggregator::ResultAggregator;
use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{error::SendError, UnboundedSender};
use tracing::{debug, trace, warn, Instrument};
use treecp_types::{
    CopyOutcome, CopyUnit, Error, FileStatus, FileSystem, ParallelDepth, ProgressReporter,
};

/// Walks a source tree and feeds copy units into the task channel
pub struct PathEnumerator {
    source: Arc<dyn FileSystem>,
    destination: Arc<dyn FileSystem>,
    source_root: PathBuf,
    destination_root: PathBuf,
    parallel_depth: ParallelDepth,
    aggregator: Arc<ResultAggregator>,
    reporter: Option<Arc<dyn ProgressReporter>>,
    units: AtomicU64,
    parallel_listings: AtomicU64,
}

impl std::fmt::Debug for PathEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathEnumerator")
            .field("source_root", &self.source_root)
            .field("destination_root", &self.destination_root)
            .field("parallel_depth", &self.parallel_depth)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl PathEnumerator {
    /// Create a new enumerator
    pub fn new(
        source: Arc<dyn FileSystem>,
        source_root: PathBuf,
        destination: Arc<dyn FileSystem>,
        destination_root: PathBuf,
        parallel_depth: ParallelDepth,
        aggregator: Arc<ResultAggregator>,
    ) -> Self {
        Self {
            source,
            destination,
            source_root,
            destination_root,
            parallel_depth,
            aggregator,
            reporter: None,
            units: AtomicU64::new(0),
            parallel_listings: AtomicU64::new(0),
        }
    }

    /// Attach a progress reporter notified of every produced unit
    #[must_use]
    pub fn with_reporter(mut self, reporter: Option<Arc<dyn ProgressReporter>>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Number of units produced so far
    pub fn units_enumerated(&self) -> u64 {
        self.units.load(Ordering::Acquire)
    }

    /// Number of directory listings that ran as their own concurrent traversal
    pub fn parallel_listings(&self) -> u64 {
        self.parallel_listings.load(Ordering::Acquire)
    }

    /// Enumerate the source root, whose status the caller has already established
    ///
    /// Returns once every traversal, including the fanned-out ones, has finished.
    pub async fn enumerate(self: Arc<Self>, root: FileStatus, tx: UnboundedSender<CopyUnit>) {
        if root.is_dir() {
            let source_root = self.source_root.clone();
            self.walk(source_root, 0, tx).await;
        } else {
            let unit = self.single_file_unit(root.len).await;
            self.emit(unit, &tx);
        }
    }

    async fn single_file_unit(&self, len: u64) -> CopyUnit {
        let into_directory = match self.destination.is_directory(&self.destination_root).await {
            Ok(is_dir) => is_dir,
            Err(e) => {
                warn!(
                    "Could not inspect destination {}: {}",
                    self.destination_root.display(),
                    e
                );
                false
            }
        };

        let destination = match self.source_root.file_name() {
            Some(name) if into_directory => self.destination_root.join(name),
            _ => self.destination_root.clone(),
        };

        CopyUnit::file(self.source_root.clone(), destination, len)
    }

    fn walk(
        self: Arc<Self>,
        dir: PathBuf,
        depth: usize,
        tx: UnboundedSender<CopyUnit>,
    ) -> BoxFuture<'static, ()> {
        async move {
            let entries = match self.source.list(&dir).await {
                Ok(entries) => entries,
                Err(error) => {
                    self.aggregator.record_listing_failure(&dir, error);
                    return;
                }
            };
            trace!("Listed {} entries in {}", entries.len(), dir.display());

            if entries.is_empty() {
                let unit = CopyUnit::directory(dir.clone(), self.destination_for(&dir));
                self.emit(unit, &tx);
                return;
            }

            let mut subdirectories = Vec::new();
            for entry in entries {
                if entry.is_dir() {
                    subdirectories.push(entry.path);
                } else {
                    let destination = self.destination_for(&entry.path);
                    self.emit(CopyUnit::file(entry.path, destination, entry.len), &tx);
                }
            }

            if self.parallel_depth.fans_out_at(depth) {
                let traversals: Vec<_> = subdirectories
                    .into_iter()
                    .map(|subdirectory| {
                        self.parallel_listings.fetch_add(1, Ordering::Relaxed);
                        debug!("Fanning out traversal of {}", subdirectory.display());
                        let handle = tokio::spawn(
                            Arc::clone(&self)
                                .walk(subdirectory.clone(), depth + 1, tx.clone())
                                .in_current_span(),
                        );
                        (subdirectory, handle)
                    })
                    .collect();

                for (subdirectory, handle) in traversals {
                    if let Err(e) = handle.await {
                        self.aggregator.record_listing_failure(
                            &subdirectory,
                            Error::other(format!("Traversal task failed: {e}")),
                        );
                    }
                }
            } else {
                for subdirectory in subdirectories {
                    Arc::clone(&self).walk(subdirectory, depth + 1, tx.clone()).await;
                }
            }
        }
        .boxed()
    }

    fn destination_for(&self, source: &Path) -> PathBuf {
        match source.strip_prefix(&self.source_root) {
            Ok(relative) if relative.as_os_str().is_empty() => self.destination_root.clone(),
            Ok(relative) => self.destination_root.join(relative),
            Err(_) => {
                warn!(
                    "{} is outside of {}",
                    source.display(),
                    self.source_root.display()
                );
                self.destination_root
                    .join(source.file_name().unwrap_or(source.as_os_str()))
            }
        }
    }

    fn emit(&self, unit: CopyUnit, tx: &UnboundedSender<CopyUnit>) {
        self.units.fetch_add(1, Ordering::AcqRel);
        if let Some(reporter) = &self.reporter {
            reporter.report_unit_discovered(&unit);
        }

        if let Err(SendError(unit)) = tx.send(unit) {
            let error = Error::other("worker pool stopped before the unit was scheduled");
            self.aggregator.record(&CopyOutcome::failed(unit, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tokio::sync::mpsc;
    use treecp_io::MemoryObjectStore;
    use treecp_types::EntryKind;

    fn sample_tree() -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        store.insert_file("/src/top.txt", "top");
        store.insert_file("/src/a/one.txt", "1");
        store.insert_file("/src/a/b/two.txt", "22");
        store.insert_file("/src/a/b/c/three.txt", "333");
        store.insert_file("/src/d/four.txt", "4444");
        store
    }

    async fn collect(
        store: &MemoryObjectStore,
        source_root: &str,
        destination_root: &str,
        depth: usize,
    ) -> (Vec<CopyUnit>, Arc<PathEnumerator>, Arc<ResultAggregator>) {
        let fs: Arc<dyn FileSystem> = Arc::new(store.clone());
        let aggregator = Arc::new(ResultAggregator::new());
        let enumerator = Arc::new(PathEnumerator::new(
            fs.clone(),
            PathBuf::from(source_root),
            fs.clone(),
            PathBuf::from(destination_root),
            ParallelDepth::new(depth).unwrap(),
            Arc::clone(&aggregator),
        ));

        let root = fs.status(Path::new(source_root)).await.unwrap().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(Arc::clone(&enumerator).enumerate(root, tx));

        let mut units = Vec::new();
        while let Some(unit) = rx.recv().await {
            units.push(unit);
        }
        units.sort_by(|a, b| a.source.cmp(&b.source));
        (units, enumerator, aggregator)
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(2, 3)]
    #[case(64, 4)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_file_once_at_any_depth(#[case] depth: usize, #[case] fan_outs: u64) {
        let store = sample_tree();
        let (units, enumerator, _) = collect(&store, "/src", "/dst", depth).await;

        let destinations: Vec<_> = units.iter().map(|u| u.destination.clone()).collect();
        assert_eq!(
            destinations,
            vec![
                PathBuf::from("/dst/a/b/c/three.txt"),
                PathBuf::from("/dst/a/b/two.txt"),
                PathBuf::from("/dst/a/one.txt"),
                PathBuf::from("/dst/d/four.txt"),
                PathBuf::from("/dst/top.txt"),
            ]
        );
        assert!(units.iter().all(|u| u.kind == EntryKind::File));
        assert_eq!(enumerator.units_enumerated(), 5);
        assert_eq!(enumerator.parallel_listings(), fan_outs);
    }

    #[tokio::test]
    async fn test_size_hints_come_from_listing() {
        let store = sample_tree();
        let (units, _, _) = collect(&store, "/src/a/b", "/out", 2).await;

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].destination, PathBuf::from("/out/c/three.txt"));
        assert_eq!(units[0].size_hint, 3);
        assert_eq!(units[1].size_hint, 2);
    }

    #[tokio::test]
    async fn test_empty_directories_become_directory_units() {
        let store = sample_tree();
        let fs: &dyn FileSystem = &store;
        fs.create_dir_all(Path::new("/src/empty")).await.unwrap();

        let (units, _, _) = collect(&store, "/src", "/dst", 2).await;
        let directories: Vec<_> = units.iter().filter(|u| u.is_dir()).collect();
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].destination, PathBuf::from("/dst/empty"));
    }

    #[tokio::test]
    async fn test_empty_root_maps_to_destination_root() {
        let store = MemoryObjectStore::new();
        let fs: &dyn FileSystem = &store;
        fs.create_dir_all(Path::new("/void")).await.unwrap();

        let (units, _, _) = collect(&store, "/void", "/dst", 2).await;
        assert_eq!(units, vec![CopyUnit::directory("/void", "/dst")]);
    }

    #[tokio::test]
    async fn test_single_file_to_missing_destination_is_verbatim() {
        let store = sample_tree();
        let (units, _, _) = collect(&store, "/src/top.txt", "/backup/renamed.txt", 2).await;
        assert_eq!(
            units,
            vec![CopyUnit::file("/src/top.txt", "/backup/renamed.txt", 3)]
        );
    }

    #[tokio::test]
    async fn test_single_file_into_existing_directory() {
        let store = sample_tree();
        store.insert_file("/backup/other.txt", "x");

        let (units, _, _) = collect(&store, "/src/top.txt", "/backup", 2).await;
        assert_eq!(units, vec![CopyUnit::file("/src/top.txt", "/backup/top.txt", 3)]);
    }

    /// Backend whose listing of any directory named `a` fails or panics
    #[derive(Debug)]
    struct UnlistableSubdirectory {
        store: MemoryObjectStore,
        panics: bool,
    }

    #[async_trait::async_trait]
    impl FileSystem for UnlistableSubdirectory {
        fn scheme(&self) -> &str {
            "flaky"
        }

        async fn status(&self, path: &Path) -> treecp_types::Result<Option<FileStatus>> {
            self.store.status(path).await
        }

        async fn list(&self, dir: &Path) -> treecp_types::Result<Vec<treecp_types::DirEntry>> {
            if dir.ends_with("a") {
                assert!(!self.panics, "listing {} blew up", dir.display());
                return Err(Error::io_at(dir, "permission denied"));
            }
            self.store.list(dir).await
        }

        async fn open(&self, path: &Path) -> treecp_types::Result<treecp_types::ByteStream> {
            self.store.open(path).await
        }

        async fn create(&self, path: &Path) -> treecp_types::Result<treecp_types::ByteSink> {
            self.store.create(path).await
        }

        async fn create_dir_all(&self, path: &Path) -> treecp_types::Result<()> {
            self.store.create_dir_all(path).await
        }

        async fn delete(&self, path: &Path, recursive: bool) -> treecp_types::Result<bool> {
            self.store.delete(path, recursive).await
        }
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_listing_failure_is_recorded_and_walk_continues(#[case] panics: bool) {
        let fs: Arc<dyn FileSystem> = Arc::new(UnlistableSubdirectory {
            store: sample_tree(),
            panics,
        });
        let aggregator = Arc::new(ResultAggregator::new());
        let enumerator = Arc::new(PathEnumerator::new(
            fs.clone(),
            PathBuf::from("/src"),
            fs,
            PathBuf::from("/dst"),
            ParallelDepth::default(),
            Arc::clone(&aggregator),
        ));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let enumeration =
            tokio::spawn(Arc::clone(&enumerator).enumerate(FileStatus::directory(), tx));
        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        enumeration.await.unwrap();

        assert_eq!(count, 2);
        let summary = aggregator.finalize();
        assert_eq!(summary.listing_failures.len(), 1);
        assert_eq!(summary.listing_failures[0].path, PathBuf::from("/src/a"));
        assert!(!summary.is_success());
    }

    #[tokio::test]
    async fn test_closed_channel_accounts_for_units() {
        let store = sample_tree();
        let fs: Arc<dyn FileSystem> = Arc::new(store);
        let aggregator = Arc::new(ResultAggregator::new());
        let enumerator = Arc::new(PathEnumerator::new(
            fs.clone(),
            PathBuf::from("/src"),
            fs,
            PathBuf::from("/dst"),
            ParallelDepth::new(0).unwrap(),
            Arc::clone(&aggregator),
        ));

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        Arc::clone(&enumerator)
            .enumerate(FileStatus::directory(), tx)
            .await;

        assert_eq!(enumerator.units_enumerated(), 5);
        assert_eq!(aggregator.finalize().failures.len(), 5);
    }
}
