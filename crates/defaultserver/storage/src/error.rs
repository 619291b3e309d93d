use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("storage operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("corrupt record for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
