//! Store error types.

use carihesap_common::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key is empty or cannot be mapped onto the backend.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend refused the write.
    #[error("Write rejected for key {0}")]
    WriteRejected(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
