//! Process-wide scan status.
//!
//! [`StatusCell`] is the single writer-side handle. Every update takes the
//! write lock for the whole mutation, so readers calling
//! [`StatusCell::snapshot`] always get a consistent copy and never a half
//! applied update. Counters only grow during a scan.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::EngineError;
use crate::duplicates::{KeyPolicy, VerifyProgress};

/// Orchestrator lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// No scan running.
    #[default]
    Idle,
    /// One scan running.
    Scanning,
    /// The last scan failed. A new scan may be started.
    Error,
}

/// Pipeline stage of the running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    /// Traversal and grouping.
    Walking,
    /// Content hashing of candidate groups.
    Verifying,
}

/// Snapshot of the scan status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatus {
    /// Lifecycle state
    pub state: ScanState,
    /// Stage of the running scan, `None` when not scanning
    pub phase: Option<ScanPhase>,
    /// Id of the running or most recent scan (0 before the first scan)
    pub scan_id: u64,
    /// Videos discovered by the walker
    pub total_files_seen: usize,
    /// Videos that went through grouping
    pub files_processed: usize,
    /// Name groups that reached two members
    pub candidate_groups: usize,
    /// Files queued for hashing
    pub files_to_hash: usize,
    /// Files hashed so far (including failures)
    pub files_hashed: usize,
    /// Duplicate sets found so far
    pub duplicate_sets_found: usize,
    /// Entries skipped because of recoverable errors
    pub entries_skipped: usize,
    /// When the running or most recent scan started
    pub started_at: Option<DateTime<Utc>>,
    /// When the last successful scan completed
    pub last_scan: Option<DateTime<Utc>>,
    /// Message of the last fatal failure, cleared by the next start
    pub last_error: Option<String>,
    /// Whether the running or most recent scan verifies content
    pub content_verify: bool,
    /// Grouping key policy of the running or most recent scan
    pub key_policy: KeyPolicy,
}

impl ScanStatus {
    /// Whether a scan is running.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }
}

/// Lock-guarded status with typed updates.
#[derive(Debug, Default)]
pub struct StatusCell {
    inner: RwLock<ScanStatus>,
}

impl StatusCell {
    /// Idle status, no scan yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of the current status.
    #[must_use]
    pub fn snapshot(&self) -> ScanStatus {
        self.read().clone()
    }

    /// Move to `Scanning` and return the new scan id.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyScanning`] if a scan is running. The running
    /// scan's status is left untouched.
    pub fn try_begin(&self, content_verify: bool, key_policy: KeyPolicy) -> Result<u64, EngineError> {
        let mut status = self.write();
        if status.is_scanning() {
            return Err(EngineError::AlreadyScanning);
        }
        let scan_id = status.scan_id + 1;
        *status = ScanStatus {
            state: ScanState::Scanning,
            phase: Some(ScanPhase::Walking),
            scan_id,
            started_at: Some(Utc::now()),
            last_scan: status.last_scan,
            content_verify,
            key_policy,
            ..ScanStatus::default()
        };
        Ok(scan_id)
    }

    /// A video was discovered.
    pub fn record_discovered(&self) {
        self.write().total_files_seen += 1;
    }

    /// A video was grouped; `group_len` is its group size afterwards.
    pub fn record_grouped(&self, group_len: usize) {
        let mut status = self.write();
        status.files_processed += 1;
        if group_len == 2 {
            status.candidate_groups += 1;
            if !status.content_verify {
                status.duplicate_sets_found += 1;
            }
        }
    }

    /// An entry was skipped after a recoverable error.
    pub fn record_skipped(&self) {
        self.write().entries_skipped += 1;
    }

    /// Close a successful scan and return the final status.
    pub fn finish_ok(&self) -> ScanStatus {
        let mut status = self.write();
        status.state = ScanState::Idle;
        status.phase = None;
        status.last_scan = Some(Utc::now());
        status.clone()
    }

    /// Close a failed scan.
    pub fn finish_err(&self, message: impl Into<String>) -> ScanStatus {
        let mut status = self.write();
        status.state = ScanState::Error;
        status.phase = None;
        status.last_error = Some(message.into());
        status.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, ScanStatus> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScanStatus> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VerifyProgress for StatusCell {
    fn on_verify_start(&self, files: usize) {
        let mut status = self.write();
        status.phase = Some(ScanPhase::Verifying);
        status.files_to_hash = files;
    }

    fn on_file_hashed(&self) {
        self.write().files_hashed += 1;
    }

    fn on_group_verified(&self, sets: usize) {
        self.write().duplicate_sets_found += sets;
    }
}
