//! JSON output structures for treecp runs

use serde::{Deserialize, Serialize};
use treecp_engine::CopyReport;
use treecp_types::{ErrorKind, Failure};

/// Complete JSON output for a copy run
#[derive(Debug, Serialize, Deserialize)]
pub struct CopyResultJson {
    /// Run metadata
    pub metadata: RunMetadata,
    /// Copy statistics
    pub stats: CopyStatsJson,
    /// Units that failed
    pub failures: Vec<FailureJson>,
    /// Directories that could not be listed
    pub listing_failures: Vec<FailureJson>,
    /// Overall result
    pub result: RunResult,
}

/// Run metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct RunMetadata {
    /// treecp version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Timestamp when the report was produced
    pub timestamp: String,
    /// Unique run identifier
    pub run_id: String,
    /// Source URI as given
    pub source: String,
    /// Destination URI as given
    pub destination: String,
}

/// Copy statistics in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct CopyStatsJson {
    /// Number of files copied
    pub files_copied: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of files skipped
    pub files_skipped: u64,
    /// Number of failed units
    pub failed: usize,
    /// Units produced by enumeration
    pub units_enumerated: u64,
    /// Directory listings that ran on their own task
    pub parallel_listings: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Throughput in bytes per second
    pub throughput_bytes_per_sec: f64,
}

/// A single failure
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureJson {
    /// Source path of the failing unit or directory
    pub path: String,
    /// Failure category
    pub kind: String,
    /// Error message
    pub error: String,
}

impl From<&Failure> for FailureJson {
    fn from(failure: &Failure) -> Self {
        let kind = match failure.error.kind() {
            ErrorKind::Usage => "usage",
            ErrorKind::SourceNotFound => "source_not_found",
            ErrorKind::DestinationConflict => "destination_conflict",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
            ErrorKind::Other => "other",
        };
        Self {
            path: failure.path.display().to_string(),
            kind: kind.to_string(),
            error: failure.error.to_string(),
        }
    }
}

/// Overall result
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether every unit was copied or skipped
    pub success: bool,
    /// Process exit code
    pub exit_code: i32,
}

impl CopyResultJson {
    /// Build the JSON document for a finished run
    pub fn from_report(report: &CopyReport, source: &str, destination: &str) -> Self {
        let summary = &report.summary;
        Self {
            metadata: RunMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                operation: "copy".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                run_id: report.run_id.to_string(),
                source: source.to_string(),
                destination: destination.to_string(),
            },
            stats: CopyStatsJson {
                files_copied: summary.files_copied,
                directories_created: summary.directories_created,
                bytes_copied: summary.bytes_copied,
                files_skipped: summary.files_skipped,
                failed: summary.failures.len(),
                units_enumerated: report.units_enumerated,
                parallel_listings: report.parallel_listings,
                duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                throughput_bytes_per_sec: report.throughput(),
            },
            failures: summary.failures.iter().map(FailureJson::from).collect(),
            listing_failures: summary
                .listing_failures
                .iter()
                .map(FailureJson::from)
                .collect(),
            result: RunResult {
                success: report.is_success(),
                exit_code: report.exit_status().code(),
            },
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {e}\"}}"))
    }
}
