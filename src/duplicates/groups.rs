//! Name-based candidate grouping and duplicate set types.
//!
//! # Overview
//!
//! Grouping is the first detection tier. Discovered videos are bucketed by a
//! key derived from the file name; a bucket with two or more members is a
//! duplicate candidate. Which key is used is decided by [`KeyPolicy`]:
//!
//! - [`KeyPolicy::Stem`] (default): file name without the extension, so
//!   `show.mp4` and `show.mkv` land together
//! - [`KeyPolicy::FileName`]: the full file name, extension included
//!
//! Members keep discovery order. Position 0 is the primary copy.
//!
//! # Example
//!
//! ```
//! use vidupe::scanner::VideoFile;
//! use vidupe::duplicates::{group_by_name, KeyPolicy};
//!
//! let files = ["/m/a.mp4", "/m/a.mkv", "/m/b.mp4"]
//!     .into_iter()
//!     .filter_map(VideoFile::from_path);
//!
//! let (groups, stats) = group_by_name(files, KeyPolicy::Stem);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].key, "a");
//! assert_eq!(groups[0].files.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scanner::path_utils::normalize_path_str;
use crate::scanner::{ContentHash, VideoFile};

/// How the grouping key is derived from a file name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// File name without its extension.
    #[default]
    Stem,
    /// Full file name including the extension.
    #[value(name = "filename")]
    FileName,
}

impl KeyPolicy {
    /// Grouping key for `path`, NFC-normalized.
    ///
    /// Returns `None` for paths without a file name.
    #[must_use]
    pub fn key_for(self, path: &Path) -> Option<String> {
        let raw = match self {
            Self::Stem => path.file_stem()?,
            Self::FileName => path.file_name()?,
        };
        Some(normalize_path_str(&raw.to_string_lossy()))
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stem => write!(f, "stem"),
            Self::FileName => write!(f, "filename"),
        }
    }
}

/// Files sharing a grouping key, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    /// Grouping key
    pub key: String,
    /// Members in discovery order
    pub files: Vec<VideoFile>,
}

impl CandidateGroup {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Statistics about a grouping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Files fed to the grouper
    pub total_files: usize,
    /// Distinct keys seen
    pub unique_keys: usize,
    /// Groups with 2+ members
    pub candidate_groups: usize,
    /// Files that belong to a candidate group
    pub files_in_groups: usize,
    /// Files dropped because their key was unique
    pub singletons_discarded: usize,
}

/// Incremental key to members mapping.
///
/// Insertion is order-sensitive: the first file inserted under a key becomes
/// its primary. Callers feeding from several threads must serialize calls to
/// [`CandidateGrouper::insert`].
#[derive(Debug, Default)]
pub struct CandidateGrouper {
    policy: KeyPolicy,
    index: HashMap<String, usize>,
    groups: Vec<CandidateGroup>,
    total_files: usize,
}

impl CandidateGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new(policy: KeyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Active key policy.
    #[must_use]
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Add a file. Returns the size of its group after insertion, or `None`
    /// if no key could be derived.
    pub fn insert(&mut self, file: VideoFile) -> Option<usize> {
        let key = self.policy.key_for(&file.path)?;
        self.total_files += 1;

        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(key.clone(), slot);
                self.groups.push(CandidateGroup {
                    key,
                    files: Vec::new(),
                });
                slot
            }
        };

        let group = &mut self.groups[slot];
        group.files.push(file);
        Some(group.files.len())
    }

    /// Number of files inserted.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Number of groups that currently have 2+ members.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.groups.iter().filter(|g| g.len() > 1).count()
    }

    /// Finish grouping. Singleton groups are dropped; the rest are returned
    /// in the order their key was first seen.
    #[must_use]
    pub fn finish(self) -> (Vec<CandidateGroup>, GroupingStats) {
        let unique_keys = self.groups.len();
        let total_files = self.total_files;
        let candidates: Vec<CandidateGroup> =
            self.groups.into_iter().filter(|g| g.len() > 1).collect();
        let files_in_groups = candidates.iter().map(CandidateGroup::len).sum();

        let stats = GroupingStats {
            total_files,
            unique_keys,
            candidate_groups: candidates.len(),
            files_in_groups,
            singletons_discarded: total_files - files_in_groups,
        };
        (candidates, stats)
    }
}

/// Group files by name in one pass.
pub fn group_by_name(
    files: impl IntoIterator<Item = VideoFile>,
    policy: KeyPolicy,
) -> (Vec<CandidateGroup>, GroupingStats) {
    let mut grouper = CandidateGrouper::new(policy);
    for file in files {
        grouper.insert(file);
    }
    let (groups, stats) = grouper.finish();
    log::debug!(
        "Grouping: {} files, {} keys, {} candidate groups",
        stats.total_files,
        stats.unique_keys,
        stats.candidate_groups
    );
    (groups, stats)
}

/// A reported set of files judged duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    /// Stable identifier within one scan's results
    pub id: String,
    /// Representative name (the grouping key)
    pub name: String,
    /// Members in discovery order; always 2 or more
    pub files: Vec<VideoFile>,
    /// Shared digest, present when content verification was on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<ContentHash>,
}

impl DuplicateSet {
    /// Name-only set from a candidate group.
    #[must_use]
    pub fn from_candidate(group: CandidateGroup) -> Self {
        Self {
            id: group.key.clone(),
            name: group.key,
            files: group.files,
            content_hash: None,
        }
    }

    /// Content-verified set. The id carries a short digest prefix so
    /// several sets from one name group stay distinct.
    #[must_use]
    pub fn verified(key: &str, hash: ContentHash, files: Vec<VideoFile>) -> Self {
        Self {
            id: format!("{}_{}", key, hash.short_hex()),
            name: key.to_string(),
            files,
            content_hash: Some(hash),
        }
    }

    /// Member paths in discovery order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// First discovered member.
    #[must_use]
    pub fn primary(&self) -> Option<&VideoFile> {
        self.files.first()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of known member sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().filter_map(|f| f.size).sum()
    }

    /// Bytes held by every member except the primary.
    #[must_use]
    pub fn wasted_size(&self) -> u64 {
        self.files.iter().skip(1).filter_map(|f| f.size).sum()
    }
}
