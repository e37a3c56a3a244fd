//! Scanner module for directory traversal, classification and hashing.
//!
//! This module provides functionality for:
//! - Lazy, sorted directory walking over several roots using walkdir
//! - Video classification with reserved and excluded directory pruning
//! - Physical identity tracking so nothing is visited twice
//! - Unicode path normalization for exclusion matching
//! - Streaming BLAKE3 content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`classifier`]: pure entry classification
//! - [`walker`]: directory traversal and video discovery
//! - [`identity`]: (device, inode) tracking
//! - [`path_utils`]: absolute + NFC path normalization
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use vidupe::scanner::{PathClassifier, Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let classifier = PathClassifier::with_defaults(&[]);
//! let walker = Walker::new(vec![PathBuf::from("/media")], classifier, WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(video) => println!("{}", video.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod classifier;
pub mod hasher;
pub mod identity;
pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use classifier::{Classification, EntryKind, PathClassifier, SkipReason};
pub use hasher::{ContentHash, Hasher, HASH_BUFFER_SIZE};
pub use identity::{IdentityTracker, PhysicalId};
pub use walker::Walker;

/// A discovered candidate video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Base file name including the extension
    pub file_name: String,
    /// Lower-cased extension with the leading dot, e.g. `.mkv`
    pub extension: String,
    /// File size in bytes, when metadata was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl VideoFile {
    /// Build a record from a path. Returns `None` for paths without a file
    /// name.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let extension = classifier::extension_of(&path).unwrap_or_default();
        Some(Self {
            path,
            file_name,
            extension,
            size: None,
        })
    }

    /// Attach the byte size.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Cycles are detected and skipped.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// Per-entry errors during scanning.
///
/// None of these abort a scan. They are logged and collected into the
/// scan's skipped list.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A directory or file could not be read.
    #[error("Cannot read {path}: {source}")]
    PathUnreadable {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configured root does not exist.
    #[error("Scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// A configured root is not a directory.
    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A followed symlink leads back to one of its ancestors.
    #[error("Symlink cycle at {path} (points to {ancestor})")]
    SymlinkCycle {
        /// The looping entry
        path: PathBuf,
        /// The ancestor it resolves to
        ancestor: PathBuf,
    },

    /// A candidate could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PathUnreadable { path, .. } | Self::SymlinkCycle { path, .. } => path,
            Self::RootNotFound(path) | Self::NotADirectory(path) => path,
            Self::Hash(err) => err.path(),
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file disappeared before it could be read.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Io { path, .. } => path,
        }
    }
}
