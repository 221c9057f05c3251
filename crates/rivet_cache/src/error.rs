//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during fingerprinting, update, and persistence.
///
/// Every variant carries the path that caused it. The rebuild decision never
/// surfaces these: it degrades them to "needs rebuild".
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// An I/O error occurred while reading metadata, content, or cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Fingerprinting a source or include failed during an update.
    #[error("failed to fingerprint {path}: {source}")]
    Fingerprint {
        /// The source or include that could not be fingerprinted.
        path: PathBuf,
        /// The underlying failure.
        source: Box<CacheError>,
    },

    /// A persisted cache file is not a valid entry document.
    #[error("failed to parse cache file {path}: {reason}")]
    Parse {
        /// The offending cache file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An entry could not be serialized.
    #[error("failed to serialize cache entry for {path}: {reason}")]
    Serialization {
        /// The source path whose entry failed to serialize.
        path: PathBuf,
        /// Description of the serialization failure.
        reason: String,
    },

    /// A persisted cache file was written with an unsupported format version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The cache file path.
        path: PathBuf,
        /// The format version this build understands.
        expected: u32,
        /// The format version found in the file.
        actual: u32,
    },
}

impl CacheError {
    /// Wraps an I/O error, mapping `NotFound` to [`CacheError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound { path }
        } else {
            CacheError::Io { path, source }
        }
    }

    /// Returns `true` if this error means a file was absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            CacheError::NotFound { .. } => true,
            CacheError::Fingerprint { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
