//! Collaborator interfaces consumed by the formation engine.
//!
//! Every trait is synchronous and object safe; implementations are shared
//! as `Arc<dyn Trait>` and must be `Send + Sync`.

use crate::error::{ManifestError, ProviderError, StackError};
use crate::manifest::Manifest;
use crate::types::{App, Capacity, Event, ParameterPatch, Release};

/// Lookup of deployed apps.
pub trait AppStore: Send + Sync {
    fn get_app(&self, name: &str) -> Result<App, ProviderError>;
}

/// Lookup of release snapshots.
pub trait ReleaseStore: Send + Sync {
    fn get_release(&self, app: &str, id: &str) -> Result<Release, ProviderError>;
}

/// Parser for serialized manifests.
pub trait ManifestLoader: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<Manifest, ManifestError>;
}

/// Source of the cluster's per-node resource ceilings.
pub trait CapacityProvider: Send + Sync {
    fn capacity(&self) -> Result<Capacity, ProviderError>;
}

/// Fixed capacity, e.g. taken from configuration.
impl CapacityProvider for Capacity {
    fn capacity(&self) -> Result<Capacity, ProviderError> {
        Ok(*self)
    }
}

/// The infrastructure stack update mechanism.
pub trait StackUpdater: Send + Sync {
    /// Apply `patch` to the parameters of `stack`. An empty `template`
    /// keeps the stack's current template.
    fn update(&self, stack: &str, template: &str, patch: &ParameterPatch)
        -> Result<(), StackError>;
}

/// Audit/notification sink.
///
/// `send` must not block and has no result: delivery failures are the
/// sink's own business.
pub trait EventSink: Send + Sync {
    fn send(&self, event: Event);
}
