//! Path normalization helpers for root and exclusion handling.
//!
//! Exclusion rules are plain prefix matches, so both sides of the comparison
//! must be brought into the same shape first:
//!
//! - made absolute against the current working directory
//! - converted to Unicode NFC (macOS hands out NFD names, Linux and Windows
//!   usually NFC)
//!
//! # Example
//!
//! ```
//! use vidupe::scanner::path_utils::{match_key, starts_with_prefix};
//! use std::path::Path;
//!
//! let excluded = match_key(Path::new("/media/cafe\u{0301}"));
//! let entry = match_key(Path::new("/media/café/clip.mp4"));
//! assert!(starts_with_prefix(&entry, &excluded));
//! ```

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a [`Path`] to NFC form.
///
/// Paths that are not valid UTF-8 are returned unchanged.
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if !unicode_normalization::is_nfc(s) => PathBuf::from(normalize_path_str(s)),
        _ => path.to_path_buf(),
    }
}

/// Make a path absolute without touching the filesystem.
///
/// Symlinks are not resolved and the path does not need to exist. If the
/// current directory cannot be determined the path is returned as-is.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(abs) => abs,
        Err(e) => {
            log::debug!("Could not make {} absolute: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

/// Absolute, NFC-normalized path. Roots are stored in this form.
#[must_use]
pub fn normalize_root(path: &Path) -> PathBuf {
    normalize_pathbuf(&absolutize(path))
}

/// String key used for exclusion prefix matching.
///
/// Lossy for non UTF-8 paths; the lossy form is applied consistently to
/// both prefix and entry, so matching still behaves.
#[must_use]
pub fn match_key(path: &Path) -> String {
    normalize_path_str(&absolutize(path).to_string_lossy())
}

/// Prefix test on normalized keys.
///
/// This is a string prefix, not a component prefix: `/media/tmp` also
/// matches `/media/tmp2`. An empty prefix never matches.
#[must_use]
pub fn starts_with_prefix(key: &str, prefix: &str) -> bool {
    !prefix.is_empty() && key.starts_with(prefix)
}
