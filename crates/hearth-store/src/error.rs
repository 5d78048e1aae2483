//! Store error types.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the document (or its lock file) failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The in-memory document could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The lock could not be acquired within the configured wait.
    #[error("timed out after {waited:?} waiting for lock on {path}")]
    LockTimeout {
        /// Document path.
        path: PathBuf,
        /// How long we waited before giving up.
        waited: Duration,
    },

    /// A writer panicked while holding the in-process lock.
    #[error("document lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
