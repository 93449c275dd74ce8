//! Errors reported by the formation collaborators.

use thiserror::Error;

/// Failure of an app, release or capacity lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure reported by the infrastructure stack engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// The engine rejected the request as invalid. Carries the engine's
    /// free-text message.
    #[error("ValidationError: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl StackError {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::Other(msg) => msg,
        }
    }
}

/// Manifest document could not be parsed.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("service with empty name")]
    EmptyServiceName,

    #[error("duplicate service: {0}")]
    DuplicateService(String),
}
