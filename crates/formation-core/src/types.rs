//! Shared types used across the formation crates.
//!
//! `App`, `Release` and `Capacity` are owned by external collaborators and
//! are read-only to the formation engine. `ProcessFormation` is the value
//! the engine produces on reads and consumes on writes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A set of stack parameters to submit to the infrastructure engine.
///
/// Ordered so that patches log and serialize deterministically.
pub type ParameterPatch = BTreeMap<String, String>;

/// Tag carrying the name of the rack that owns an app's stack.
pub const RACK_TAG: &str = "Rack";

// ── App ───────────────────────────────────────────────────────────

/// A deployed application and its flat stack state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct App {
    pub name: String,
    /// Active release id. Empty means the app has never been released.
    #[serde(default)]
    pub release: String,
    /// Stack parameters; the encoded formation state lives here.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Values computed by the infrastructure (balancer hostnames, ...).
    #[serde(default)]
    pub outputs: HashMap<String, String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl App {
    /// Whether a release has ever been promoted for this app.
    pub fn is_released(&self) -> bool {
        !self.release.is_empty()
    }

    /// Identifier of the infrastructure stack backing this app.
    pub fn stack_name(&self) -> String {
        match self.tags.get(RACK_TAG) {
            Some(rack) if !rack.is_empty() => format!("{rack}-{}", self.name),
            _ => self.name.clone(),
        }
    }
}

// ── Release ───────────────────────────────────────────────────────

/// An immutable snapshot of an app's manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub id: String,
    pub app: String,
    /// Serialized manifest document (TOML).
    pub manifest: String,
    /// Unix timestamp (seconds) when this release was created.
    #[serde(default)]
    pub created_at: u64,
}

impl Release {
    /// Build the composite key for the releases table.
    pub fn table_key(&self) -> String {
        release_key(&self.app, &self.id)
    }
}

/// Composite `{app}:{id}` key for a release.
pub fn release_key(app: &str, id: &str) -> String {
    format!("{app}:{id}")
}

// ── Capacity ──────────────────────────────────────────────────────

/// Per-node resource ceilings of the compute cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capacity {
    /// CPU units a single node offers.
    pub instance_cpu: i64,
    /// Memory (MB) a single node offers.
    pub instance_memory: i64,
}

// ── Formation ─────────────────────────────────────────────────────

/// Desired scaling state of one process of an app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProcessFormation {
    pub name: String,
    /// Desired replicas. `-1` marks an unmanaged count, `0` scaled to zero.
    pub count: i64,
    /// CPU units; `0` leaves the process unconstrained.
    pub cpu: i64,
    pub memory: i64,
    /// Host ports bound for this process.
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub balancer: String,
}

// ── Events ────────────────────────────────────────────────────────

/// Action published when a formation change is submitted.
pub const SCALE_EVENT: &str = "release:scale";

/// An audit/notification event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub action: String,
    pub data: BTreeMap<String, String>,
}

impl Event {
    /// The notification sent for a formation save.
    pub fn scale(app: &str, release: &str) -> Self {
        let mut data = BTreeMap::new();
        data.insert("app".to_string(), app.to_string());
        data.insert("id".to_string(), release.to_string());
        Self {
            action: SCALE_EVENT.to_string(),
            data,
        }
    }
}
