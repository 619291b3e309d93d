//! Error types for the host binary

use defaultserver_storage::StorageError;
use defaultserver_types::TypesError;
use thiserror::Error;

/// Result type for host operations
pub type AppResult<T> = Result<T, AppError>;

/// Host errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Host configuration could not be built
    #[error("configuration error: {0}")]
    Config(String),

    /// Preference store could not be opened
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bad command line or console input
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] TypesError),

    /// Console I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
