//! formation-engine — process formation codec and reconciliation.
//!
//! Translates between the flat stack parameters of an app and structured
//! `ProcessFormation` values, and submits validated changes back to the
//! stack engine:
//!
//! - Decodes and encodes `(count, cpu, memory)` under the combined
//!   (`WebFormation = "2,256,512"`) and individual (`WebDesiredCount`,
//!   `WebCpu`, `WebMemory`) parameter schemes
//! - Discovers bound host ports from `<Prefix>Port<N>Host` parameters
//! - Validates requests against the cluster's per-node capacity
//! - Classifies stack engine refusals into conflicts
//!
//! # Architecture
//!
//! ```text
//! FormationReconciler
//!   ├── list / get ── AppStore → ReleaseStore → ManifestLoader
//!   │                   └── assemble (codec::decode, discover_ports, balancer)
//!   └── save ──────── AppStore, CapacityProvider
//!                       └── validate → codec::encode → EventSink
//!                             → StackUpdater → classify
//! ```

pub mod assembler;
pub mod classify;
pub mod codec;
pub mod error;
pub mod ports;
pub mod reconciler;
pub mod validator;

pub use assembler::assemble;
pub use classify::classify;
pub use codec::{FormationKeys, ScaleSettings, Scheme};
pub use error::{
    ConflictKind, FormatError, FormationError, FormationField, FormationResult, ValidationError,
};
pub use ports::discover_ports;
pub use reconciler::{Collaborators, FormationReconciler};
pub use validator::validate;
