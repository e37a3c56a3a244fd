//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! [`Walker`] turns a list of scan roots into a lazy sequence of
//! [`VideoFile`] records. Roots are walked one after another in the order
//! given; entries inside a directory are visited sorted by file name, so
//! discovery order is deterministic for an unchanging tree.
//!
//! # Features
//!
//! - Directory pruning through [`PathClassifier`] before descending
//! - Per-directory error tolerance: unreadable subtrees are reported and skipped
//! - Missing roots are reported and skipped
//! - Physical identity tracking of directories, so overlapping roots and
//!   looping links are walked once
//! - Every distinct file path is emitted, including hardlinks and
//!   symlinked files
//! - Optional symlink following for directories, with cycle detection
//!
//! # Example
//!
//! ```no_run
//! use vidupe::scanner::{PathClassifier, Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(
//!     vec![PathBuf::from("/media"), PathBuf::from("/archive")],
//!     PathClassifier::with_defaults(&[]),
//!     WalkerConfig::default(),
//! );
//! let videos: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} videos", videos.len());
//! ```

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::classifier::{Classification, Entry, PathClassifier, SkipReason};
use super::identity::{IdentityTracker, PhysicalId};
use super::path_utils::normalize_root;
use super::{ScanError, VideoFile, WalkerConfig};

/// Log a progress line every this many discovered videos.
const PROGRESS_LOG_INTERVAL: usize = 1000;

/// Multi-root directory walker for video discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    roots: Vec<PathBuf>,
    classifier: PathClassifier,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker over `roots`, visited in the given order.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, classifier: PathClassifier, config: WalkerConfig) -> Self {
        Self {
            roots,
            classifier,
            config,
        }
    }

    /// Roots as given to [`Walker::new`].
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk all roots, yielding discovered videos.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Every call starts a fresh walk with no state shared with
    /// earlier walks.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            walker: self,
            roots: self.roots.iter(),
            current: None,
            tracker: IdentityTracker::new(),
            videos_found: 0,
        }
    }
}

struct RootWalk {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

/// Lazy iterator returned by [`Walker::walk`].
pub struct Walk<'a> {
    walker: &'a Walker,
    roots: std::slice::Iter<'a, PathBuf>,
    current: Option<RootWalk>,
    tracker: IdentityTracker,
    videos_found: usize,
}

impl Walk<'_> {
    /// Videos yielded so far.
    #[must_use]
    pub fn videos_found(&self) -> usize {
        self.videos_found
    }

    fn open_root(&mut self, raw: &Path) -> Result<Option<RootWalk>, ScanError> {
        let root = normalize_root(raw);

        if self.walker.classifier.is_excluded(&root) {
            log::info!("Skipping excluded root: {}", root.display());
            return Ok(None);
        }

        let metadata = match fs::metadata(&root) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Scan root not found: {}", root.display());
                return Err(ScanError::RootNotFound(root));
            }
            Err(e) => {
                log::warn!("Cannot access scan root {}: {}", root.display(), e);
                return Err(ScanError::PathUnreadable {
                    path: root,
                    source: e,
                });
            }
        };

        if !metadata.is_dir() {
            log::warn!("Scan root is not a directory: {}", root.display());
            return Err(ScanError::NotADirectory(root));
        }

        if !self.tracker.first_dir_visit(PhysicalId::of(&root, &metadata)) {
            log::info!(
                "Skipping root {}: overlaps an already walked tree",
                root.display()
            );
            return Ok(None);
        }

        log::debug!("Walking root: {}", root.display());
        let entries = WalkDir::new(&root)
            .follow_links(self.walker.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        Ok(Some(RootWalk { root, entries }))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<VideoFile, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(current) = self.current.as_mut() else {
                let root = self.roots.next()?;
                match self.open_root(root) {
                    Ok(walk) => self.current = walk,
                    Err(e) => return Some(Err(e)),
                }
                continue;
            };

            let Some(result) = current.entries.next() else {
                self.current = None;
                continue;
            };

            let outcome = match result {
                Ok(entry) => visit_entry(self.walker, &mut self.tracker, current, &entry),
                Err(err) => visit_error(self.walker, current, err),
            };

            if let Some(item) = outcome {
                if item.is_ok() {
                    self.videos_found += 1;
                    if self.videos_found % PROGRESS_LOG_INTERVAL == 0 {
                        log::info!("Discovered {} videos so far", self.videos_found);
                    }
                }
                return Some(item);
            }
        }
    }
}

fn visit_entry(
    walker: &Walker,
    tracker: &mut IdentityTracker,
    current: &mut RootWalk,
    entry: &DirEntry,
) -> Option<Result<VideoFile, ScanError>> {
    if entry.depth() == 0 {
        return None;
    }

    let path = entry.path();
    let file_type = entry.file_type();

    // With follow_links the file type is the target's, so a symlink type
    // here means we are not following: a link to a file is taken at its own
    // path, a link to a directory is not descended into.
    let mut link_target = None;
    if file_type.is_symlink() {
        match fs::metadata(path) {
            Ok(target) if target.is_file() => link_target = Some(target),
            Ok(_) => {
                log::trace!("Not following directory symlink: {}", path.display());
                return None;
            }
            Err(e) => {
                log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
                return None;
            }
        }
    }

    if file_type.is_dir() {
        let entry_info = Entry::directory(path, &current.root, true);
        if let Classification::SkipDirectory(reason) = walker.classifier.classify(&entry_info) {
            log::debug!("Skipping {} directory: {}", reason, path.display());
            current.entries.skip_current_dir();
            return None;
        }
        if let Ok(metadata) = entry.metadata() {
            if !tracker.first_dir_visit(PhysicalId::of(path, &metadata)) {
                log::info!("Skipping already walked directory: {}", path.display());
                current.entries.skip_current_dir();
            }
        }
        return None;
    }

    if link_target.is_none() && !file_type.is_file() {
        return None;
    }

    if walker.classifier.classify(&Entry::file(path, &current.root)) != Classification::Video {
        log::trace!("Not a video: {}", path.display());
        return None;
    }

    let metadata = match link_target {
        Some(target) => target,
        None => match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                let source = io::Error::from(e);
                log::warn!("Cannot read metadata for {}: {}", path.display(), source);
                return Some(Err(ScanError::PathUnreadable {
                    path: path.to_path_buf(),
                    source,
                }));
            }
        },
    };

    if !tracker.first_file_visit(path) {
        log::debug!("Skipping already discovered path: {}", path.display());
        return None;
    }

    log::trace!("Found video: {}", path.display());
    VideoFile::from_path(path).map(|video| Ok(video.with_size(metadata.len())))
}

fn visit_error(
    walker: &Walker,
    current: &RootWalk,
    err: walkdir::Error,
) -> Option<Result<VideoFile, ScanError>> {
    let path = err
        .path()
        .map_or_else(|| current.root.clone(), Path::to_path_buf);

    if let Some(ancestor) = err.loop_ancestor() {
        let ancestor = ancestor.to_path_buf();
        log::warn!(
            "Symlink cycle detected at {} (points to {}), skipping",
            path.display(),
            ancestor.display()
        );
        return Some(Err(ScanError::SymlinkCycle { path, ancestor }));
    }

    let source = io::Error::from(err);
    match walker
        .classifier
        .classify(&Entry::directory(&path, &current.root, false))
    {
        Classification::SkipDirectory(SkipReason::Unreadable) => {
            log::warn!("Skipping unreadable {}: {}", path.display(), source);
            Some(Err(ScanError::PathUnreadable { path, source }))
        }
        _ => {
            log::debug!("Ignoring read error under pruned path {}: {}", path.display(), source);
            None
        }
    }
}
