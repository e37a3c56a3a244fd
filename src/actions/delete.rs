//! Single-file deletion, permanent or to the platform trash.
//!
//! # Overview
//!
//! Deletion is a thin wrapper over the filesystem:
//! - [`DeleteMode::Permanent`] removes the file (`std::fs::remove_file`)
//! - [`DeleteMode::Trash`] moves it to the system trash (recoverable)
//!
//! Whether a path must belong to the latest results is decided by the
//! caller through [`DeleteGuard`]; this module never looks at scan results.
//!
//! # Example
//!
//! ```no_run
//! use vidupe::actions::delete::{delete_path, DeleteMode};
//! use std::path::Path;
//!
//! match delete_path(Path::new("/media/y/show.mp4"), DeleteMode::Trash) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path is a directory; only single files are deleted.
    #[error("not a file: {0}")]
    NotAFile(PathBuf),

    /// The guard requires the path to be part of the latest results.
    #[error("not part of the latest scan results: {0}")]
    NotInResults(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path that could not be trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::NotInResults(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// How a file is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Remove the file for good.
    #[default]
    Permanent,
    /// Move the file to the platform trash.
    Trash,
}

/// Which paths a delete request may target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteGuard {
    /// Any existing file.
    #[default]
    Unrestricted,
    /// Only paths present in the most recently published results.
    KnownResultsOnly,
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Mode that was used.
    pub mode: DeleteMode,
}

/// Delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `NotAFile` if the path is a directory
/// - `PermissionDenied` if removal is not allowed
/// - `TrashFailed` if the trash backend refuses the file
pub fn delete_path(path: &Path, mode: DeleteMode) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len();

    match mode {
        DeleteMode::Permanent => {
            fs::remove_file(path).map_err(|e| {
                log::error!("Delete failed for {}: {}", path.display(), e);
                DeleteError::from_io(path, e)
            })?;
            log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
        }
        DeleteMode::Trash => {
            trash::delete(path).map_err(|e| {
                log::error!("Trash operation failed for {}: {}", path.display(), e);
                DeleteError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
        }
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode,
    })
}
