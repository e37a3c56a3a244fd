//! Content verification of name-based candidate groups.
//!
//! # Overview
//!
//! The second detection tier. Every file of every candidate group is hashed
//! in full, then each group is split by digest. Only digest buckets with two
//! or more files become [`DuplicateSet`]s.
//!
//! - Groups are verified independently; equal digests in different groups
//!   are never merged.
//! - Files that cannot be read are left out of their group and reported.
//! - Groups run in parallel on a small dedicated rayon pool. Files inside a
//!   group are hashed one after another.

use std::collections::HashMap;

use rayon::prelude::*;

use super::groups::{CandidateGroup, DuplicateSet};
use crate::scanner::{ContentHash, HashError, Hasher, VideoFile};

/// Progress hooks for verification.
///
/// Called from pool threads, hence `Sync`.
pub trait VerifyProgress: Sync {
    /// Verification is about to hash `files` files.
    fn on_verify_start(&self, _files: usize) {}

    /// One file was hashed (or failed to hash).
    fn on_file_hashed(&self) {}

    /// One group finished and produced `sets` duplicate sets.
    fn on_group_verified(&self, _sets: usize) {}
}

/// No-op progress.
impl VerifyProgress for () {}

/// Splits candidate groups by full-content digest.
pub struct ContentVerifier {
    pool: rayon::ThreadPool,
    hasher: Hasher,
}

impl ContentVerifier {
    /// Create a verifier with its own pool of `io_threads` workers
    /// (at least one).
    ///
    /// # Errors
    ///
    /// Fails if the thread pool cannot be built.
    pub fn new(io_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(io_threads.max(1))
            .thread_name(|i| format!("vidupe-hash-{i}"))
            .build()?;
        Ok(Self {
            pool,
            hasher: Hasher::new(),
        })
    }

    /// Use a custom hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Number of pool workers.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Verify all groups.
    ///
    /// Returns the refined sets (in group order, then first-member order)
    /// and the hash failures.
    pub fn verify<P>(
        &self,
        groups: Vec<CandidateGroup>,
        progress: &P,
    ) -> (Vec<DuplicateSet>, Vec<HashError>)
    where
        P: VerifyProgress + ?Sized,
    {
        let total: usize = groups.iter().map(CandidateGroup::len).sum();
        progress.on_verify_start(total);
        log::info!(
            "Verifying {} files in {} candidate groups on {} threads",
            total,
            groups.len(),
            self.threads()
        );

        let per_group: Vec<(Vec<DuplicateSet>, Vec<HashError>)> = self.pool.install(|| {
            groups
                .into_par_iter()
                .map(|group| {
                    let outcome = self.verify_group(group, progress);
                    progress.on_group_verified(outcome.0.len());
                    outcome
                })
                .collect()
        });

        let mut sets = Vec::new();
        let mut errors = Vec::new();
        for (group_sets, group_errors) in per_group {
            sets.extend(group_sets);
            errors.extend(group_errors);
        }
        (sets, errors)
    }

    fn verify_group<P>(
        &self,
        group: CandidateGroup,
        progress: &P,
    ) -> (Vec<DuplicateSet>, Vec<HashError>)
    where
        P: VerifyProgress + ?Sized,
    {
        let mut index: HashMap<ContentHash, usize> = HashMap::new();
        let mut buckets: Vec<(ContentHash, Vec<VideoFile>)> = Vec::new();
        let mut errors = Vec::new();

        for file in group.files {
            let result = self.hasher.hash_file(&file.path);
            progress.on_file_hashed();
            match result {
                Ok(hash) => match index.get(&hash) {
                    Some(&slot) => buckets[slot].1.push(file),
                    None => {
                        index.insert(hash, buckets.len());
                        buckets.push((hash, vec![file]));
                    }
                },
                Err(e) => {
                    log::warn!("Skipping file during verification: {}", e);
                    errors.push(e);
                }
            }
        }

        let sets = buckets
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(hash, files)| DuplicateSet::verified(&group.key, hash, files))
            .collect();
        (sets, errors)
    }
}
