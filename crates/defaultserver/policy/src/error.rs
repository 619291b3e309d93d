//! Error types for policy loading

use std::path::PathBuf;
use thiserror::Error;

/// Policy loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Policy file could not be read
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy document is not valid
    #[error("malformed policy document from {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Bundled default could not be written
    #[error("failed to create default policy file {path}: {message}")]
    Materialize { path: PathBuf, message: String },

    /// A property exists but has an unexpected shape
    #[error("property '{key}' has unexpected type: {message}")]
    PropertyType { key: String, message: String },
}

/// Result type for policy operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
