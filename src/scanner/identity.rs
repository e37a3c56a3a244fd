//! Visit tracking for directories and files.
//!
//! A single scan must never walk the same physical directory twice. That
//! happens when roots overlap (`/media` and `/media/movies`) or when a
//! followed symlink points back into an already walked tree, so directories
//! are tracked by physical identity.
//!
//! Files are tracked by path only. Hardlinks and symlinks to the same data
//! are distinct paths and each of them is emitted.
//!
//! # Platform Support
//!
//! - **Unix**: `(device, inode)` pairs from file metadata
//! - **Other**: the canonicalized path, falling back to the path itself
//!
//! # Example
//!
//! ```no_run
//! use vidupe::scanner::identity::{IdentityTracker, PhysicalId};
//! use std::path::Path;
//!
//! let mut tracker = IdentityTracker::new();
//! let path = Path::new("/media/movies");
//! let meta = std::fs::metadata(path).unwrap();
//!
//! assert!(tracker.first_dir_visit(PhysicalId::of(path, &meta)));
//! assert!(!tracker.first_dir_visit(PhysicalId::of(path, &meta)));
//! ```

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Identity of a physical filesystem object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicalId {
    /// Device and inode number (Unix).
    Inode {
        /// Device id
        dev: u64,
        /// Inode number
        ino: u64,
    },
    /// Canonical path, used where inode numbers are not available.
    Path(PathBuf),
}

impl PhysicalId {
    /// Derive the identity of `path` from its (symlink-followed) metadata.
    #[cfg(unix)]
    #[must_use]
    pub fn of(_path: &Path, metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }

    /// Derive the identity of `path`. Metadata carries no stable file index
    /// here, so the canonical path stands in for it.
    #[cfg(not(unix))]
    #[must_use]
    pub fn of(path: &Path, _metadata: &Metadata) -> Self {
        Self::Path(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
    }
}

/// Remembers which directories were walked and which file paths were
/// emitted.
/// A tracker lives for exactly
/// one walk; nothing carries over between scans.
///
/// # Thread Safety
///
/// `IdentityTracker` is NOT thread-safe; the walker owns it.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    dirs: HashSet<PhysicalId>,
    files: HashSet<PathBuf>,
}

impl IdentityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory visit. Returns `false` if it was already walked.
    pub fn first_dir_visit(&mut self, id: PhysicalId) -> bool {
        self.dirs.insert(id)
    }

    /// Record a file emission. Returns `false` if this path was already
    /// emitted.
    pub fn first_file_visit(&mut self, path: &Path) -> bool {
        if self.files.contains(path) {
            return false;
        }
        self.files.insert(path.to_path_buf())
    }

    /// Number of distinct directories walked.
    #[must_use]
    pub fn dirs_seen(&self) -> usize {
        self.dirs.len()
    }

    /// Number of distinct file paths emitted.
    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.files.len()
    }
}
