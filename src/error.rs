//! Structured error handling and exit codes.

use serde::Serialize;

use crate::engine::ScanReport;

/// Exit codes for the vidupe binary.
///
/// - 0: Success (scan completed, duplicates found; or a non-scan command succeeded)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (duplicates or not, some entries were skipped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Scan completed but skipped some entries.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Exit code for a finished scan.
    #[must_use]
    pub fn for_report(report: &ScanReport) -> Self {
        if report.is_partial() {
            Self::PartialSuccess
        } else if report.has_duplicates() {
            Self::Success
        } else {
            Self::NoDuplicates
        }
    }

    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "VD000",
            Self::GeneralError => "VD001",
            Self::NoDuplicates => "VD002",
            Self::PartialSuccess => "VD003",
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "VD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
