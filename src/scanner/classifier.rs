//! Entry classification: video file, other file, or directory to skip.
//!
//! The classifier is a pure function of the entry's path, a few facts the
//! walker observed about it (kind, readability) and static configuration.
//! It never touches the filesystem itself, so it can be exercised with
//! synthetic paths.
//!
//! # Rules
//!
//! - A directory is skipped when its normalized path starts with an excluded
//!   prefix, when any path segment below the scan root starts with `.` or
//!   `$` or equals a reserved system name, or when it cannot be read.
//! - A file is a video iff its lower-cased extension (with the leading dot)
//!   is in the configured set and it is not under an excluded prefix.
//!
//! # Example
//!
//! ```
//! use vidupe::scanner::classifier::{Classification, Entry, PathClassifier, SkipReason};
//! use std::path::{Path, PathBuf};
//!
//! let classifier = PathClassifier::with_defaults(&[PathBuf::from("/media/tmp")]);
//! let root = Path::new("/media");
//!
//! let movie = Entry::file(Path::new("/media/x/Show.MKV"), root);
//! assert_eq!(classifier.classify(&movie), Classification::Video);
//!
//! let hidden = Entry::directory(Path::new("/media/.cache"), root, true);
//! assert_eq!(
//!     classifier.classify(&hidden),
//!     Classification::SkipDirectory(SkipReason::Reserved)
//! );
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::path_utils::{match_key, starts_with_prefix};

/// Recognized video container extensions.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg", ".3gp",
    ".3g2", ".asf", ".f4v", ".f4p", ".f4a", ".f4b", ".vob", ".ogv", ".ogg", ".mts", ".m2ts", ".ts",
    ".qt", ".divx", ".xvid", ".m1v", ".m2v", ".mp2", ".mpe", ".mpv", ".m4p", ".rmvb", ".rm",
];

/// Directory names reserved by operating systems.
pub const DEFAULT_RESERVED_NAMES: &[&str] = &["System Volume Information", "lost+found", "RECYCLER"];

/// Segment prefixes that mark hidden or system directories.
pub const RESERVED_PREFIXES: &[char] = &['.', '$'];

/// Why a directory is not descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The process cannot list the directory.
    Unreadable,
    /// A path segment is hidden or system-reserved.
    Reserved,
    /// The path falls under a configured exclusion prefix.
    Excluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable => write!(f, "unreadable"),
            Self::Reserved => write!(f, "reserved"),
            Self::Excluded => write!(f, "excluded"),
        }
    }
}

/// Classifier verdict for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A candidate video file.
    Video,
    /// A file that is not a candidate.
    NotVideo,
    /// A directory whose subtree must not be walked.
    SkipDirectory(SkipReason),
}

/// What the walker knows about an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or a symlink resolved to one).
    File,
    /// Directory, with the outcome of trying to read it.
    Directory {
        /// Whether listing the directory succeeded
        readable: bool,
    },
}

/// An entry presented to the classifier.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Absolute path of the entry
    pub path: &'a Path,
    /// Scan root the entry was reached from
    pub root: &'a Path,
    /// Entry kind
    pub kind: EntryKind,
}

impl<'a> Entry<'a> {
    /// A file entry.
    #[must_use]
    pub fn file(path: &'a Path, root: &'a Path) -> Self {
        Self {
            path,
            root,
            kind: EntryKind::File,
        }
    }

    /// A directory entry.
    #[must_use]
    pub fn directory(path: &'a Path, root: &'a Path, readable: bool) -> Self {
        Self {
            path,
            root,
            kind: EntryKind::Directory { readable },
        }
    }
}

/// Decides which entries are videos and which directories to skip.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    extensions: HashSet<String>,
    reserved_names: HashSet<String>,
    exclude: Vec<String>,
}

impl PathClassifier {
    /// Build a classifier.
    ///
    /// Extensions are accepted with or without the leading dot and in any
    /// case. Exclusions are made absolute and NFC-normalized up front.
    #[must_use]
    pub fn new<E, R>(extensions: E, reserved_names: R, exclude: &[PathBuf]) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        let reserved_names = reserved_names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .collect();
        let exclude = exclude
            .iter()
            .map(|p| match_key(p))
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            extensions,
            reserved_names,
            exclude,
        }
    }

    /// Classifier with the default extension and reserved-name sets.
    #[must_use]
    pub fn with_defaults(exclude: &[PathBuf]) -> Self {
        Self::new(DEFAULT_VIDEO_EXTENSIONS, DEFAULT_RESERVED_NAMES, exclude)
    }

    /// Classify one entry.
    #[must_use]
    pub fn classify(&self, entry: &Entry<'_>) -> Classification {
        match entry.kind {
            EntryKind::Directory { readable } => {
                if self.is_excluded(entry.path) {
                    Classification::SkipDirectory(SkipReason::Excluded)
                } else if self.has_reserved_segment(entry.path, entry.root) {
                    Classification::SkipDirectory(SkipReason::Reserved)
                } else if !readable {
                    Classification::SkipDirectory(SkipReason::Unreadable)
                } else {
                    // Directories are never videos; the walker descends.
                    Classification::NotVideo
                }
            }
            EntryKind::File => {
                if !self.is_video_extension(entry.path) || self.is_excluded(entry.path) {
                    return Classification::NotVideo;
                }
                let parent = entry.path.parent().unwrap_or(entry.root);
                if self.has_reserved_segment(parent, entry.root) {
                    Classification::NotVideo
                } else {
                    Classification::Video
                }
            }
        }
    }

    /// Whether `path` falls under a configured exclusion prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let key = match_key(path);
        self.exclude.iter().any(|prefix| starts_with_prefix(&key, prefix))
    }

    /// Whether the extension of `path` is a recognized video container.
    #[must_use]
    pub fn is_video_extension(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Number of recognized extensions.
    #[must_use]
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    fn has_reserved_segment(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(segment) => {
                let segment = segment.to_string_lossy();
                segment.starts_with(RESERVED_PREFIXES)
                    || self.reserved_names.contains(segment.as_ref())
            }
            _ => false,
        })
    }
}

/// Lower-cased extension of `path` including the leading dot.
///
/// Returns `None` for names without an extension, including dot-files
/// such as `.mp4`.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}
