//! Error types and handling for treecp
//!
//! Errors fall into two groups. Usage, scheme, source and configuration errors abort a
//! run before any worker is started. Destination conflicts and I/O errors are captured
//! per copy unit and only surface through the run summary.

use crate::ExitStatus;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - the unit is reported, the run continues
    Low,
    /// Medium severity - the unit failed, the run continues
    Medium,
    /// High severity - the run cannot start
    High,
    /// Critical severity - the invocation itself is malformed
    Critical,
}

/// Main error type for treecp operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Missing or malformed arguments
    #[error("Usage error: {message}")]
    Usage {
        /// Description of what is wrong with the invocation
        message: String,
    },

    /// No backend is registered for a URI scheme
    #[error("Unsupported URI scheme: {scheme}")]
    UnsupportedScheme {
        /// The scheme that could not be resolved
        scheme: String,
    },

    /// Source root does not exist
    #[error("Source not found: {}", path.display())]
    SourceNotFound {
        /// Path of the missing source root
        path: PathBuf,
    },

    /// Destination exists and overwriting is disabled
    #[error("Destination already exists: {}", path.display())]
    DestinationConflict {
        /// Destination path that already exists
        path: PathBuf,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed invocation, including unknown URI schemes
    Usage,
    /// Missing source root
    SourceNotFound,
    /// Destination conflict
    DestinationConflict,
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage { .. } | Self::UnsupportedScheme { .. } => ErrorKind::Usage,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::DestinationConflict { .. } => ErrorKind::DestinationConflict,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Usage { .. } | Self::UnsupportedScheme { .. } => ErrorSeverity::Critical,
            Self::SourceNotFound { .. } | Self::Config { .. } => ErrorSeverity::High,
            Self::DestinationConflict { .. } => ErrorSeverity::Low,
            Self::Io { .. } | Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if this error aborts a run before scheduling starts
    pub fn is_fatal(&self) -> bool {
        self.severity() >= ErrorSeverity::High
    }

    /// Process exit status this error maps to when it ends a run
    pub fn exit_status(&self) -> ExitStatus {
        match self.kind() {
            ErrorKind::Usage => ExitStatus::Usage,
            ErrorKind::DestinationConflict | ErrorKind::Io => ExitStatus::CopyFailed,
            ErrorKind::SourceNotFound | ErrorKind::Config | ErrorKind::Other => ExitStatus::Fatal,
        }
    }

    /// Create a new usage error
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new unsupported scheme error
    pub fn unsupported_scheme<S: Into<String>>(scheme: S) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
        }
    }

    /// Create a new source-not-found error
    pub fn source_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a new destination conflict error
    pub fn conflict<P: Into<PathBuf>>(path: P) -> Self {
        Self::DestinationConflict { path: path.into() }
    }

    /// Create an I/O error that names the path it happened on
    pub fn io_at<E: Display>(path: &Path, error: E) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), error),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_error_kind_consistency(message in ".*") {
            let errors = vec![
                Error::Usage { message: message.clone() },
                Error::UnsupportedScheme { scheme: message.clone() },
                Error::SourceNotFound { path: PathBuf::from(&message) },
                Error::DestinationConflict { path: PathBuf::from(&message) },
                Error::Io { message: message.clone() },
                Error::Config { message: message.clone() },
                Error::Other { message: message.clone() },
            ];

            for error in errors {
                let kind = error.kind();
                match error {
                    Error::Usage { .. } | Error::UnsupportedScheme { .. } => {
                        prop_assert_eq!(kind, ErrorKind::Usage);
                    }
                    Error::SourceNotFound { .. } => {
                        prop_assert_eq!(kind, ErrorKind::SourceNotFound);
                    }
                    Error::DestinationConflict { .. } => {
                        prop_assert_eq!(kind, ErrorKind::DestinationConflict);
                    }
                    Error::Io { .. } => prop_assert_eq!(kind, ErrorKind::Io),
                    Error::Config { .. } => prop_assert_eq!(kind, ErrorKind::Config),
                    Error::Other { .. } => prop_assert_eq!(kind, ErrorKind::Other),
                }
            }
        }

        #[test]
        fn test_per_unit_errors_never_fatal(message in ".*") {
            let conflict = Error::conflict(PathBuf::from(&message));
            let io = Error::Io { message };

            prop_assert!(!conflict.is_fatal());
            prop_assert!(!io.is_fatal());
            prop_assert_eq!(conflict.exit_status(), ExitStatus::CopyFailed);
            prop_assert_eq!(io.exit_status(), ExitStatus::CopyFailed);
        }
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Low < ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test file");
        let error = Error::from(io_error);

        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(error.severity(), ErrorSeverity::Medium);
        assert!(error.to_string().contains("test file"));
    }

    #[test]
    fn test_io_at_names_path() {
        let error = Error::io_at(Path::new("/data/out.bin"), "disk full");
        assert_eq!(error.to_string(), "I/O error: /data/out.bin: disk full");
    }

    #[test]
    fn test_source_not_found_is_fatal() {
        let error = Error::source_not_found("/nonexistent");

        assert_eq!(error.kind(), ErrorKind::SourceNotFound);
        assert!(error.is_fatal());
        assert_eq!(error.exit_status(), ExitStatus::Fatal);
        assert!(error.to_string().contains("/nonexistent"));
    }

    #[test]
    fn test_usage_errors_map_to_usage_exit() {
        assert_eq!(Error::usage("missing -d").exit_status(), ExitStatus::Usage);
        assert_eq!(
            Error::unsupported_scheme("ftp").exit_status(),
            ExitStatus::Usage
        );
    }

    #[test]
    fn test_config_error() {
        let error = Error::config("invalid buffer size");

        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.severity(), ErrorSeverity::High);
        assert!(error.is_fatal());
    }
}
