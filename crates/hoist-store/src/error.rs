//! Error types for the artifact store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("build {0} not found")]
    NotFound(String),

    #[error("scan error: {0}")]
    Scan(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("copy error: {0}")]
    Copy(String),

    #[error("staged binary failed checksum verification: {0}")]
    Verify(String),

    #[error("remove error: {0}")]
    Remove(String),

    #[error("pointer write error: {0}")]
    Pointer(String),
}
