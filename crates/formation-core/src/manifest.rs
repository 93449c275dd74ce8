//! Release manifest parser.
//!
//! A manifest is a TOML document declaring the processes of a release as an
//! ordered `[[services]]` array. Declaration order is preserved and is the
//! order in which formations are listed.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::ManifestError;
use crate::provider::ManifestLoader;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Manifest {
    #[serde(default)]
    pub services: Vec<Service>,
}

/// One process declared by a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Service {
    pub name: String,
    pub image: Option<String>,
    pub command: Option<String>,
    /// Port mappings, e.g. `"80:5000"`.
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

impl Manifest {
    /// Parse a manifest document.
    pub fn load(data: &[u8]) -> Result<Self, ManifestError> {
        let content = std::str::from_utf8(data)?;
        let manifest: Manifest = toml::from_str(content)?;
        manifest.check()?;
        Ok(manifest)
    }

    /// Find a declared process by name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    fn check(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(ManifestError::EmptyServiceName);
            }
            if !seen.insert(service.name.as_str()) {
                return Err(ManifestError::DuplicateService(service.name.clone()));
            }
        }
        Ok(())
    }
}

/// [`ManifestLoader`] for TOML manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestLoader;

impl ManifestLoader for TomlManifestLoader {
    fn parse(&self, data: &[u8]) -> Result<Manifest, ManifestError> {
        Manifest::load(data)
    }
}
