//! Scan orchestration.
//!
//! [`ScanEngine`] owns the scan lifecycle, the published results and the
//! status cell. It is cheap to clone; clones share the same state.
//!
//! # Lifecycle
//!
//! `Idle -> Scanning -> Idle | Error`. At most one scan runs at a time; a
//! second [`ScanEngine::start_scan`] while scanning is rejected with
//! [`EngineError::AlreadyScanning`]. After either terminal state a new scan
//! may start.
//!
//! # Publishing
//!
//! Results are swapped in only after a scan completes, before the status
//! returns to idle. Readers never see partial results; a failed scan leaves
//! the previous results in place.
//!
//! # Example
//!
//! ```no_run
//! use vidupe::config::Config;
//! use vidupe::engine::{ScanEngine, ScanRequest};
//! use std::path::PathBuf;
//!
//! let engine = ScanEngine::new(Config::default());
//! let handle = engine
//!     .start_scan(ScanRequest::new(vec![PathBuf::from("/media")], vec![], false))
//!     .unwrap();
//! let report = handle.wait().unwrap();
//! for set in report.sets.iter() {
//!     println!("{}: {} copies", set.name, set.len());
//! }
//! ```

pub mod pipeline;
pub mod status;

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::actions::{self, DeleteError, DeleteGuard, DeleteResult};
use crate::config::Config;
use crate::duplicates::{DuplicateSet, KeyPolicy};
use crate::scanner::path_utils::normalize_root;
use crate::scanner::ScanError;

pub use pipeline::ScanPlan;
pub use status::{ScanPhase, ScanState, ScanStatus, StatusCell};

/// Failures that stop a scan from producing any result.
#[derive(Debug, Error)]
pub enum ScanFatal {
    /// The hashing pool could not be created.
    #[error("failed to build hashing thread pool: {0}")]
    ThreadPool(String),

    /// The worker thread could not be spawned.
    #[error("failed to spawn scan worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// The pipeline panicked.
    #[error("scan worker panicked: {0}")]
    Panicked(String),
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scan is already running.
    #[error("a scan is already in progress")]
    AlreadyScanning,

    /// Neither the request nor the configuration names a root.
    #[error("no scan roots given and none configured")]
    NoRoots,

    /// The scan failed as a whole.
    #[error(transparent)]
    Fatal(#[from] ScanFatal),
}

/// Parameters of one scan. Empty roots and a missing mode fall back to the
/// engine configuration; exclusions add to the configured ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    /// Roots to walk, in order
    pub roots: Vec<PathBuf>,
    /// Extra exclusion prefixes
    pub exclude: Vec<PathBuf>,
    /// Content verification override
    pub content_verify: Option<bool>,
}

impl ScanRequest {
    /// Fully specified request.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, exclude: Vec<PathBuf>, content_verify: bool) -> Self {
        Self {
            roots,
            exclude,
            content_verify: Some(content_verify),
        }
    }
}

/// Lifecycle notifications.
///
/// Called from the scan worker thread. Implementations should return
/// quickly.
pub trait ScanObserver: Send + Sync {
    /// A scan was accepted.
    fn on_scan_started(&self, _scan_id: u64, _plan: &ScanPlan) {}

    /// A scan completed and its results are published.
    fn on_scan_completed(&self, _report: &ScanReport) {}

    /// A scan failed.
    fn on_scan_failed(&self, _scan_id: u64, _error: &ScanFatal) {}
}

/// Summary of a completed scan.
#[derive(Debug)]
pub struct ScanReport {
    /// Scan id
    pub scan_id: u64,
    /// Whether content verification ran
    pub content_verify: bool,
    /// Grouping key policy
    pub key_policy: KeyPolicy,
    /// Wall-clock duration
    pub duration: Duration,
    /// Final counters
    pub status: ScanStatus,
    /// The published duplicate sets
    pub sets: Arc<Vec<DuplicateSet>>,
    /// Entries skipped because of recoverable errors
    pub skipped: Vec<ScanError>,
}

impl ScanReport {
    /// Whether any duplicate set was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.sets.is_empty()
    }

    /// Whether some entries were skipped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Handle to a running scan.
#[derive(Debug)]
pub struct ScanHandle {
    scan_id: u64,
    handle: JoinHandle<Result<ScanReport, EngineError>>,
}

impl ScanHandle {
    /// Id of the scan.
    #[must_use]
    pub fn scan_id(&self) -> u64 {
        self.scan_id
    }

    /// Whether the worker has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the scan ends.
    ///
    /// # Errors
    ///
    /// Returns the scan's fatal error, if any.
    pub fn wait(self) -> Result<ScanReport, EngineError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => Err(ScanFatal::Panicked(panic_message(payload.as_ref())).into()),
        }
    }
}

struct EngineInner {
    config: Config,
    status: StatusCell,
    results: RwLock<Arc<Vec<DuplicateSet>>>,
    observers: RwLock<Vec<Arc<dyn ScanObserver>>>,
}

/// The duplicate detection engine.
#[derive(Clone)]
pub struct ScanEngine {
    inner: Arc<EngineInner>,
}

impl ScanEngine {
    /// Create an idle engine with no results.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                status: StatusCell::new(),
                results: RwLock::new(Arc::new(Vec::new())),
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Register a lifecycle observer.
    pub fn subscribe(&self, observer: Arc<dyn ScanObserver>) {
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Start a scan on a dedicated worker thread.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoRoots`] if no root is known
    /// - [`EngineError::AlreadyScanning`] if a scan is running
    /// - [`EngineError::Fatal`] if the worker cannot be spawned
    pub fn start_scan(&self, request: ScanRequest) -> Result<ScanHandle, EngineError> {
        let plan = ScanPlan::resolve(&self.inner.config, request)?;
        let scan_id = match self
            .inner
            .status
            .try_begin(plan.content_verify, plan.key_policy)
        {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Scan request rejected: a scan is already in progress");
                return Err(e);
            }
        };

        log::info!(
            "Starting scan {} over {} root(s) (content verification: {}, key: {})",
            scan_id,
            plan.roots.len(),
            if plan.content_verify { "on" } else { "off" },
            plan.key_policy
        );
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name(format!("vidupe-scan-{scan_id}"))
            .spawn(move || inner.run(scan_id, plan));

        match spawned {
            Ok(handle) => Ok(ScanHandle { scan_id, handle }),
            Err(e) => {
                let fatal = ScanFatal::WorkerSpawn(e);
                log::error!("Scan {} failed: {}", scan_id, fatal);
                self.inner.status.finish_err(fatal.to_string());
                self.inner.notify(|o| o.on_scan_failed(scan_id, &fatal));
                Err(fatal.into())
            }
        }
    }

    /// Current status snapshot. Safe to call at any time.
    #[must_use]
    pub fn status(&self) -> ScanStatus {
        self.inner.status.snapshot()
    }

    /// Results of the most recently completed scan; empty before the first.
    #[must_use]
    pub fn results(&self) -> Arc<Vec<DuplicateSet>> {
        let results = self.inner.results.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*results)
    }

    /// Delete a single file according to the configured mode and guard.
    ///
    /// Published results are not modified; fetch results again after a
    /// rescan.
    ///
    /// # Errors
    ///
    /// [`DeleteError::NotInResults`] when the guard rejects the path, or
    /// the filesystem error otherwise.
    pub fn delete_path(&self, path: &Path) -> Result<DeleteResult, DeleteError> {
        let config = &self.inner.config;
        if config.delete_guard == DeleteGuard::KnownResultsOnly {
            let results = self.results();
            let normalized = normalize_root(path);
            if !results.iter().any(|set| set.contains(&normalized)) {
                log::warn!("Refusing to delete {}: not in latest results", path.display());
                return Err(DeleteError::NotInResults(path.to_path_buf()));
            }
        }
        actions::delete_path(path, config.delete_mode)
    }
}

impl EngineInner {
    /// A panicking observer is logged and skipped; it never interrupts the
    /// lifecycle transition around it.
    fn notify(&self, event: impl Fn(&dyn ScanObserver)) {
        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| event(observer.as_ref())));
            if let Err(payload) = delivered {
                log::error!("Scan observer panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }

    fn run(&self, scan_id: u64, plan: ScanPlan) -> Result<ScanReport, EngineError> {
        let started = Instant::now();
        self.notify(|o| o.on_scan_started(scan_id, &plan));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pipeline::run(&self.config, &plan, &self.status)
        }))
        .unwrap_or_else(|payload| Err(ScanFatal::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(output) => {
                let sets = Arc::new(output.sets);
                *self.results.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&sets);
                let status = self.status.finish_ok();

                let report = ScanReport {
                    scan_id,
                    content_verify: plan.content_verify,
                    key_policy: plan.key_policy,
                    duration: started.elapsed(),
                    status,
                    sets,
                    skipped: output.skipped,
                };
                log::info!(
                    "Scan {} complete: {} duplicate set(s), {} video(s), {} skipped, {:.2?}",
                    scan_id,
                    report.sets.len(),
                    report.status.total_files_seen,
                    report.skipped.len(),
                    report.duration
                );
                self.notify(|o| o.on_scan_completed(&report));
                Ok(report)
            }
            Err(fatal) => {
                log::error!("Scan {} failed: {}", scan_id, fatal);
                self.status.finish_err(fatal.to_string());
                self.notify(|o| o.on_scan_failed(scan_id, &fatal));
                Err(fatal.into())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
