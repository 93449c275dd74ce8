//! Formation engine error types.

use std::fmt;

use thiserror::Error;

use formation_core::{ManifestError, ProviderError, StackError};

/// Field of the `(count, cpu, memory)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationField {
    Count,
    Cpu,
    Memory,
}

impl fmt::Display for FormationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Count => "count",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        })
    }
}

/// Stored formation parameters are malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{process} formation settings not in Count,Cpu,Memory format")]
    FieldCount { process: String, found: usize },

    #[error("{process} {field} not numeric")]
    NotNumeric {
        process: String,
        field: FormationField,
        value: String,
    },

    #[error("{process} {field} parameter {key} missing")]
    Missing {
        process: String,
        field: FormationField,
        key: String,
    },
}

/// A requested formation violates a capacity or range rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("requested count {count} must be -1 or greater")]
    CountTooLow { count: i64 },

    #[error("requested cpu {cpu} greater than instance size {instance_cpu}")]
    CpuExceedsInstance { cpu: i64, instance_cpu: i64 },

    #[error("requested cpu {cpu} must be 0 or greater")]
    CpuNegative { cpu: i64 },

    #[error("requested memory {memory} greater than instance size {instance_memory}")]
    MemoryExceedsInstance { memory: i64, instance_memory: i64 },
}

/// Why the stack engine refused an otherwise valid update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The patch matches the current stack state.
    NoUpdates,
    /// A previous update is still in flight.
    AlreadyUpdating,
}

/// Errors returned by formation operations.
#[derive(Debug, Error)]
pub enum FormationError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no updates are to be performed: {app}")]
    NoUpdates { app: String },

    #[error("app is already updating: {app}")]
    AlreadyUpdating { app: String },

    #[error("no release for app: {0}")]
    NoRelease(String),

    #[error("no such process: {0}")]
    NoSuchProcess(String),

    #[error("could not parse manifest for release: {release}")]
    Manifest {
        release: String,
        #[source]
        source: ManifestError,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Stack(#[from] StackError),
}

impl FormationError {
    pub fn conflict(kind: ConflictKind, app: &str) -> Self {
        match kind {
            ConflictKind::NoUpdates => Self::NoUpdates {
                app: app.to_string(),
            },
            ConflictKind::AlreadyUpdating => Self::AlreadyUpdating {
                app: app.to_string(),
            },
        }
    }

    /// The conflict condition, if this is one.
    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            Self::NoUpdates { .. } => Some(ConflictKind::NoUpdates),
            Self::AlreadyUpdating { .. } => Some(ConflictKind::AlreadyUpdating),
            _ => None,
        }
    }

    /// App, release or process does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NoRelease(_) | Self::NoSuchProcess(_) => true,
            Self::Provider(e) => e.is_not_found(),
            _ => false,
        }
    }
}

pub type FormationResult<T> = Result<T, FormationError>;
