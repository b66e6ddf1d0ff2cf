//! URI scheme resolution
//!
//! A location is written either as a plain path, which always refers to the local
//! filesystem, or as `scheme://rest`. For `file://` the rest is the local path; for
//! any other scheme the rest is mapped to the absolute path `/rest` inside that backend.

use crate::LocalFileSystem;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use treecp_types::{Error, FileSystem, Result};

/// A resolved location: the backend that owns it and the path inside that backend
#[derive(Debug, Clone)]
pub struct Location {
    /// Backend serving this location
    pub fs: Arc<dyn FileSystem>,
    /// Path within the backend
    pub path: PathBuf,
}

/// Registry of filesystem backends keyed by URI scheme
#[derive(Debug, Clone, Default)]
pub struct FileSystemRegistry {
    backends: HashMap<String, Arc<dyn FileSystem>>,
}

impl FileSystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the local filesystem registered under `file`
    pub fn with_defaults() -> Self {
        Self::new().register(Arc::new(LocalFileSystem::new()))
    }

    /// Register a backend under its own scheme, replacing any previous one
    #[must_use]
    pub fn register(mut self, fs: Arc<dyn FileSystem>) -> Self {
        let scheme = fs.scheme().to_ascii_lowercase();
        debug!("Registering filesystem backend for scheme '{}'", scheme);
        self.backends.insert(scheme, fs);
        self
    }

    /// Registered schemes, sorted
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Resolve a URI or plain path to a backend and a path inside it
    pub fn resolve(&self, uri: &str) -> Result<Location> {
        let (scheme, path) = match uri.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = scheme.to_ascii_lowercase();
                let path = if scheme == LocalFileSystem::SCHEME {
                    PathBuf::from(rest)
                } else {
                    PathBuf::from(format!("/{}", rest.trim_start_matches('/')))
                };
                (scheme, path)
            }
            None => (LocalFileSystem::SCHEME.to_string(), PathBuf::from(uri)),
        };

        if path.as_os_str().is_empty() {
            return Err(Error::usage(format!("empty path in location '{uri}'")));
        }

        let fs = self
            .backends
            .get(&scheme)
            .cloned()
            .ok_or_else(|| Error::unsupported_scheme(scheme))?;

        Ok(Location { fs, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryObjectStore;
    use rstest::rstest;

    #[rstest]
    #[case("/data/in", "/data/in")]
    #[case("relative/dir", "relative/dir")]
    #[case("file:///data/in", "/data/in")]
    #[case("FILE:///data/in", "/data/in")]
    fn test_local_locations(#[case] uri: &str, #[case] expected: &str) {
        let location = FileSystemRegistry::with_defaults().resolve(uri).unwrap();
        assert_eq!(location.fs.scheme(), "file");
        assert_eq!(location.path, PathBuf::from(expected));
    }

    #[rstest]
    #[case("mem://bucket/key", "/bucket/key")]
    #[case("mem:///bucket/key", "/bucket/key")]
    #[case("mem://bucket", "/bucket")]
    fn test_object_store_locations(#[case] uri: &str, #[case] expected: &str) {
        let registry =
            FileSystemRegistry::with_defaults().register(Arc::new(MemoryObjectStore::new()));
        let location = registry.resolve(uri).unwrap();
        assert_eq!(location.fs.scheme(), "mem");
        assert_eq!(location.path, PathBuf::from(expected));
    }

    #[test]
    fn test_unknown_scheme() {
        let result = FileSystemRegistry::with_defaults().resolve("s3://bucket/key");
        assert_eq!(result.unwrap_err(), Error::unsupported_scheme("s3"));
    }

    #[test]
    fn test_empty_path_is_usage_error() {
        let result = FileSystemRegistry::with_defaults().resolve("");
        assert!(matches!(result, Err(Error::Usage { .. })));
    }

    #[test]
    fn test_schemes() {
        let registry =
            FileSystemRegistry::with_defaults().register(Arc::new(MemoryObjectStore::new()));
        assert_eq!(registry.schemes(), vec!["file", "mem"]);
    }
}
