//! The scan pipeline run by the worker thread.
//!
//! walk -> group -> (verify) -> duplicate sets. Per-entry failures are
//! collected into the skipped list; only setup failures are fatal.

use std::path::PathBuf;

use super::status::StatusCell;
use super::{EngineError, ScanFatal, ScanRequest};
use crate::config::Config;
use crate::duplicates::{CandidateGrouper, ContentVerifier, DuplicateSet, KeyPolicy};
use crate::scanner::{PathClassifier, ScanError, Walker, WalkerConfig};

/// A request resolved against the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Roots in walk order
    pub roots: Vec<PathBuf>,
    /// Configured exclusions followed by request exclusions
    pub exclude: Vec<PathBuf>,
    /// Run the content verification tier
    pub content_verify: bool,
    /// Grouping key policy
    pub key_policy: KeyPolicy,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Hashing pool size
    pub io_threads: usize,
}

impl ScanPlan {
    /// Fill request gaps from `config`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoRoots`] if neither the request nor the
    /// configuration names a root.
    pub fn resolve(config: &Config, request: ScanRequest) -> Result<Self, EngineError> {
        let roots = if request.roots.is_empty() {
            config.scan_paths.clone()
        } else {
            request.roots
        };
        if roots.is_empty() {
            return Err(EngineError::NoRoots);
        }

        let mut exclude = config.exclude_paths.clone();
        exclude.extend(request.exclude);

        Ok(Self {
            roots,
            exclude,
            content_verify: request.content_verify.unwrap_or(config.scan_by_content),
            key_policy: config.key_policy,
            follow_symlinks: config.follow_symlinks,
            io_threads: config.io_threads.max(1),
        })
    }
}

/// What a completed pipeline hands back.
#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub sets: Vec<DuplicateSet>,
    pub skipped: Vec<ScanError>,
}

pub(crate) fn run(
    config: &Config,
    plan: &ScanPlan,
    status: &StatusCell,
) -> Result<PipelineOutput, ScanFatal> {
    // Set up everything that can fail before touching the filesystem.
    let classifier = PathClassifier::new(&config.video_extensions, &config.reserved_names, &plan.exclude);
    let verifier = if plan.content_verify {
        let verifier = ContentVerifier::new(plan.io_threads)
            .map_err(|e| ScanFatal::ThreadPool(e.to_string()))?;
        Some(verifier)
    } else {
        None
    };

    let walker = Walker::new(
        plan.roots.clone(),
        classifier,
        WalkerConfig::new(plan.follow_symlinks),
    );
    let mut grouper = CandidateGrouper::new(plan.key_policy);
    let mut skipped = Vec::new();

    for item in walker.walk() {
        match item {
            Ok(video) => {
                status.record_discovered();
                if let Some(len) = grouper.insert(video) {
                    status.record_grouped(len);
                }
            }
            Err(e) => {
                status.record_skipped();
                skipped.push(e);
            }
        }
    }

    let (groups, stats) = grouper.finish();
    log::info!(
        "Walk finished: {} videos, {} candidate groups, {} entries skipped",
        stats.total_files,
        stats.candidate_groups,
        skipped.len()
    );

    let sets = match verifier {
        Some(verifier) => {
            let (sets, failures) = verifier.verify(groups, status);
            for failure in failures {
                status.record_skipped();
                skipped.push(ScanError::Hash(failure));
            }
            sets
        }
        None => groups.into_iter().map(DuplicateSet::from_candidate).collect(),
    };

    Ok(PipelineOutput { sets, skipped })
}
