//! treecp integration testing suite
//!
//! Cross-crate integration tests and benchmarks for treecp, plus the shared tree
//! fixtures they build on.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Shared fixtures for integration tests and benchmarks
pub mod test_utils;
