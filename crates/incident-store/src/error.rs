//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded.
    #[error("Failed to serialize {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A stored line could not be decoded.
    #[error("Corrupt record in {path} at line {line}")]
    Deserialization {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic rewrite failed (temp file couldn't be renamed).
    #[error("Failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store refused the batch; nothing was written.
    #[error("{0}")]
    Rejected(String),

    /// The store cannot be reached.
    #[error("{0}")]
    Unavailable(String),

    /// No upload with this id.
    #[error("upload {0} not found")]
    NotFound(u64),

    /// A previous writer panicked while holding the lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
