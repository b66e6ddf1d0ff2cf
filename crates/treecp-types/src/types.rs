//! Core data types for treecp
//!
//! This module provides the data model of a copy run: filesystem entries as reported by
//! a backend, the copy units produced by enumeration, per-unit outcomes and the
//! aggregate summary with its exit status.

use crate::Error;
use std::path::{Path, PathBuf};

/// Kind of a filesystem entry or copy unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Status of a single path as reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStatus {
    /// Entry kind
    pub kind: EntryKind,
    /// Length in bytes (0 for directories)
    pub len: u64,
}

impl FileStatus {
    /// Status of a regular file
    pub fn file(len: u64) -> Self {
        Self {
            kind: EntryKind::File,
            len,
        }
    }

    /// Status of a directory
    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            len: 0,
        }
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// One child returned by listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the child
    pub path: PathBuf,
    /// Entry kind
    pub kind: EntryKind,
    /// Length in bytes (0 for directories)
    pub len: u64,
}

impl DirEntry {
    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A single unit of copy work, created by enumeration and consumed by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyUnit {
    /// Source path
    pub source: PathBuf,
    /// Destination path
    pub destination: PathBuf,
    /// What the unit materializes at the destination
    pub kind: EntryKind,
    /// Expected number of bytes, as seen at listing time
    pub size_hint: u64,
}

impl CopyUnit {
    /// Create a unit that copies one file
    pub fn file<S: Into<PathBuf>, D: Into<PathBuf>>(
        source: S,
        destination: D,
        size_hint: u64,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind: EntryKind::File,
            size_hint,
        }
    }

    /// Create a unit that materializes an empty directory
    pub fn directory<S: Into<PathBuf>, D: Into<PathBuf>>(source: S, destination: D) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind: EntryKind::Directory,
            size_hint: 0,
        }
    }

    /// Whether the unit is a directory unit
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Terminal status of one copy unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Data was transferred (or the directory was created)
    Copied,
    /// Destination existed and the conflict was ignored
    Skipped,
    /// The unit failed
    Failed(Error),
}

/// Result of processing one copy unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// The processed unit
    pub unit: CopyUnit,
    /// Final status
    pub status: OutcomeStatus,
    /// Bytes written to the destination
    pub bytes_transferred: u64,
}

impl CopyOutcome {
    /// Outcome of a successful transfer
    pub fn copied(unit: CopyUnit, bytes_transferred: u64) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Copied,
            bytes_transferred,
        }
    }

    /// Outcome of a unit skipped because of an ignored conflict
    pub fn skipped(unit: CopyUnit) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Skipped,
            bytes_transferred: 0,
        }
    }

    /// Outcome of a failed unit
    pub fn failed(unit: CopyUnit, error: Error) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Failed(error),
            bytes_transferred: 0,
        }
    }

    /// Check if the unit was copied
    pub fn is_copied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Copied)
    }

    /// Check if the unit failed
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

/// A recorded failure: the path it concerns and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Source path of the failed unit or directory listing
    pub path: PathBuf,
    /// Error that caused the failure
    pub error: Error,
}

impl Failure {
    /// Create a new failure record
    pub fn new<P: AsRef<Path>>(path: P, error: Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            error,
        }
    }
}

/// Aggregate result of a copy run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of files copied
    pub files_copied: u64,
    /// Number of empty directories materialized
    pub directories_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of units skipped because of ignored conflicts
    pub files_skipped: u64,
    /// Per-unit failures, in the order they were recorded
    pub failures: Vec<Failure>,
    /// Directories that could not be listed during enumeration
    pub listing_failures: Vec<Failure>,
}

impl Summary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of copy units this summary accounts for
    pub fn units_accounted(&self) -> u64 {
        self.files_copied
            + self.directories_created
            + self.files_skipped
            + self.failures.len() as u64
    }

    /// Total number of failures, including listing failures
    pub fn failure_count(&self) -> usize {
        self.failures.len() + self.listing_failures.len()
    }

    /// Whether the run completed without any failure
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Process exit status for this summary
    pub fn exit_status(&self) -> ExitStatus {
        if self.is_success() {
            ExitStatus::Success
        } else {
            ExitStatus::CopyFailed
        }
    }
}

/// Process exit status of a treecp invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every unit was copied or skipped
    Success,
    /// The run completed but at least one unit or listing failed
    CopyFailed,
    /// The invocation was malformed
    Usage,
    /// The run could not start
    Fatal,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::CopyFailed => 1,
            Self::Usage => 2,
            Self::Fatal => 3,
        }
    }
}
