//! Error types for the formation state store.

use formation_core::ProviderError;
use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("invalid app name: {0:?}")]
    InvalidName(String),

    #[error("stack {stack} already belongs to app {app}")]
    StackTaken { stack: String, app: String },
}

impl From<StateError> for ProviderError {
    fn from(e: StateError) -> Self {
        ProviderError::Backend(e.to_string())
    }
}
