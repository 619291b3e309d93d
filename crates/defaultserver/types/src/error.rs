use thiserror::Error;

/// Result type for type construction.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised while parsing identities and server names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid player id '{input}': {reason}")]
    InvalidPlayerId { input: String, reason: String },

    #[error("invalid server name: {0}")]
    InvalidServerName(String),
}
