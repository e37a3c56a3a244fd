//! JSON output formatter for scan reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "id": "show",
//!       "name": "show",
//!       "files": [
//!         { "path": "/media/x/show.mp4", "size": 1024 },
//!         { "path": "/media/y/show.mp4", "size": 1024 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "scan_id": 1,
//!     "content_verify": false,
//!     "key_policy": "stem",
//!     "total_files": 3,
//!     "duplicate_sets": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 1024,
//!     "entries_skipped": 0,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "VD000"
//!   },
//!   "skipped": []
//! }
//! ```
//!
//! With content verification each set also carries a `hash` field.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateSet, KeyPolicy};
use crate::engine::ScanReport;
use crate::error::ExitCode;

/// A single member in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as discovered
    pub path: String,
    /// Size in bytes, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// Set id
    pub id: String,
    /// Representative name
    pub name: String,
    /// BLAKE3 digest as hex, content mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Members in discovery order
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateSet {
    /// Convert a duplicate set.
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            hash: set.content_hash.map(|h| h.to_hex()),
            files: set
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.path.to_string_lossy().into_owned(),
                    size: f.size,
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Scan id
    pub scan_id: u64,
    /// Whether content verification ran
    pub content_verify: bool,
    /// Grouping key policy
    pub key_policy: KeyPolicy,
    /// Videos discovered
    pub total_files: usize,
    /// Duplicate sets reported
    pub duplicate_sets: usize,
    /// Members beyond the primary of each set
    pub duplicate_files: usize,
    /// Bytes held by non-primary members
    pub reclaimable_space: u64,
    /// Entries skipped because of recoverable errors
    pub entries_skipped: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "VD000")
    pub exit_code_name: String,
}

/// A skipped entry in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSkipped {
    /// Path that was skipped
    pub path: String,
    /// Why it was skipped
    pub error: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Entries skipped during the scan
    pub skipped: Vec<JsonSkipped>,
}

impl JsonOutput {
    /// Build the output for a finished scan.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode) -> Self {
        let sets = report.sets.as_slice();
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from_set).collect(),
            summary: JsonSummary {
                scan_id: report.scan_id,
                content_verify: report.content_verify,
                key_policy: report.key_policy,
                total_files: report.status.total_files_seen,
                duplicate_sets: sets.len(),
                duplicate_files: sets.iter().map(|s| s.len().saturating_sub(1)).sum(),
                reclaimable_space: sets.iter().map(DuplicateSet::wasted_size).sum(),
                entries_skipped: report.skipped.len(),
                scan_duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            skipped: report
                .skipped
                .iter()
                .map(|e| JsonSkipped {
                    path: e.path().to_string_lossy().into_owned(),
                    error: e.to_string(),
                })
                .collect(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
