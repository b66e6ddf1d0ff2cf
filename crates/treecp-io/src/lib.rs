//! Storage backends and streaming copy executor for treecp
//!
//! This crate provides the concrete side of the treecp filesystem abstraction:
//!
//! - **Backends**: [`LocalFileSystem`] for local disks and [`MemoryObjectStore`], an
//!   object store with a flat key space and prefix-implied directories
//! - **URI resolution**: [`FileSystemRegistry`] maps URI schemes to backends
//! - **Streaming copy**: [`CopyExecutor`] moves one copy unit through a bounded
//!   [`CopyBuffer`], creating destination parents on the way
//!
//! # Examples
//!
//! ```rust
//! use treecp_io::{FileSystemRegistry, MemoryObjectStore};
//! use std::sync::Arc;
//!
//! let registry = FileSystemRegistry::with_defaults()
//!     .register(Arc::new(MemoryObjectStore::new()));
//! let location = registry.resolve("mem://bucket/reports").unwrap();
//! assert_eq!(location.fs.scheme(), "mem");
//! assert_eq!(location.path, std::path::PathBuf::from("/bucket/reports"));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod copy;
pub mod local;
pub mod memory;
pub mod uri;

pub use buffer::CopyBuffer;
pub use copy::CopyExecutor;
pub use local::LocalFileSystem;
pub use memory::MemoryObjectStore;
pub use uri::{FileSystemRegistry, Location};
