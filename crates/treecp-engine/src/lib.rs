//! Concurrent tree-copy engine for treecp
//!
//! This crate wires the pieces of a copy run together:
//!
//! - **Enumeration**: [`PathEnumerator`] walks the source tree with depth-bounded
//!   parallel fan-out and feeds copy units into an unbounded task channel
//! - **Scheduling**: [`WorkerPool`] drains the channel with a fixed number of workers
//! - **Conflicts**: [`ConflictResolver`] applies the overwrite/ignore policy at copy time
//! - **Aggregation**: [`ResultAggregator`] owns every run-wide counter and failure list
//!
//! The engine only ever talks to [`treecp_types::FileSystem`] trait objects, so the same
//! run works between any two registered backends.
//!
//! # Examples
//!
//! ```rust,no_run
//! use treecp_engine::{CopyEngine, CopyOptions, CopyRequest};
//!
//! # async fn example() -> treecp_types::Result<()> {
//! let engine = CopyEngine::new(CopyOptions::default().with_ignore_failures(true));
//! let report = engine.execute(CopyRequest::local("/data/in", "/data/out")).await?;
//! println!("Copied {} bytes", report.summary.bytes_copied);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod engine;
pub mod enumerator;
pub mod resolver;
pub mod scheduler;
pub mod task;

pub use aggregator::ResultAggregator;
pub use engine::{CopyEngine, EngineBuilder};
pub use enumerator::PathEnumerator;
pub use resolver::{ConflictDecision, ConflictPolicy, ConflictResolver};
pub use scheduler::{SchedulerConfig, WorkerPool};
pub use task::{CopyOptions, CopyReport, CopyRequest, RunId};
