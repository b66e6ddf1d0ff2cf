//! Core type system and error handling for treecp
//!
//! This crate provides the foundational types shared by every treecp crate:
//!
//! - **Error handling**: the error taxonomy of a copy run with kinds and severity levels
//! - **Data model**: copy units, per-unit outcomes and the run summary
//! - **Traits**: the filesystem capability set and progress reporting hooks
//! - **Configuration**: validated newtypes for thread count, buffer size and fan-out depth
//!
//! # Features
//!
//! - `serde`: Enable serialization support for the configuration newtypes
//!
//! # Examples
//!
//! ```rust
//! use treecp_types::{Error, ExitStatus, Failure, Summary};
//!
//! let mut summary = Summary {
//!     files_copied: 10,
//!     bytes_copied: 1024 * 1024,
//!     ..Summary::default()
//! };
//! assert_eq!(summary.exit_status(), ExitStatus::Success);
//!
//! summary.failures.push(Failure::new("/src/a.txt", Error::conflict("/dst/a.txt")));
//! assert_eq!(summary.exit_status().code(), 1);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BufferSize, ParallelDepth, ThreadCount};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_creation() {
        let summary = Summary::new();
        assert_eq!(summary.files_copied, 0);
        assert_eq!(summary.bytes_copied, 0);
        assert!(summary.is_success());
    }

    #[test]
    fn test_error_severity() {
        let io_error = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert_eq!(io_error.severity(), ErrorSeverity::Medium);

        let usage_error = Error::usage("missing -s");
        assert_eq!(usage_error.severity(), ErrorSeverity::Critical);
        assert!(usage_error.is_fatal());
    }

    #[test]
    fn test_buffer_size_validation() {
        assert!(BufferSize::new(4096).is_ok());
        assert!(BufferSize::new(131_072).is_ok());
        assert!(BufferSize::new(1024).is_err()); // Too small
        assert!(BufferSize::new(5000).is_err()); // Not power of two
    }
}
