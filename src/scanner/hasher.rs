//! BLAKE3 file hasher with streaming support.
//!
//! Files are read in fixed-size chunks so memory use does not depend on the
//! file size. Only candidate groups are ever hashed; the digest is used to
//! split a group and is never persisted.

use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use serde::{Serialize, Serializer};

use super::HashError;

/// Read buffer size for streaming hashes (8 KiB).
pub const HASH_BUFFER_SIZE: usize = 8 * 1024;

/// A full-content BLAKE3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 8 hex characters, used in duplicate set ids.
    #[must_use]
    pub fn short_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex()[..8].to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Streaming content hasher.
///
/// # Example
///
/// ```no_run
/// use vidupe::scanner::Hasher;
/// use std::path::Path;
///
/// let hasher = Hasher::new();
/// let digest = hasher.hash_file(Path::new("movie.mp4")).unwrap();
/// println!("{digest}");
/// ```
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Hasher with the default 8 KiB chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: HASH_BUFFER_SIZE,
        }
    }

    /// Override the chunk size. Zero is bumped to one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Chunk size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// [`HashError::NotFound`] if the file disappeared,
    /// [`HashError::PermissionDenied`] if it cannot be opened, and
    /// [`HashError::Io`] for any other read failure.
    pub fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
        let file = File::open(path).map_err(|e| classify_io_error(path, e))?;
        self.hash_reader(file)
            .map_err(|e| classify_io_error(path, e))
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ContentHash> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(ContentHash(*hasher.finalize().as_bytes()))
    }
}

fn classify_io_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
