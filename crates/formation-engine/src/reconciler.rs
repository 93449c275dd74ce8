//! FormationReconciler — reads and writes app formations.
//!
//! Reads resolve the app's active release, parse its manifest and assemble
//! one `ProcessFormation` per declared process from the app's stack
//! parameters. Writes validate the request against the current capacity,
//! encode it into a parameter patch and hand the patch to the stack
//! engine.
//!
//! Nothing is cached: every call re-reads the app and capacity.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use formation_core::{
    App, AppStore, CapacityProvider, Event, EventSink, Manifest, ManifestLoader, ProcessFormation,
    ReleaseStore, StackUpdater,
};

use crate::assembler::assemble;
use crate::classify::classify;
use crate::codec::{self, ScaleSettings};
use crate::error::{FormationError, FormationResult};
use crate::validator::validate;

/// Template argument meaning "keep the stack's current template".
const KEEP_TEMPLATE: &str = "";

/// External services the reconciler talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub apps: Arc<dyn AppStore>,
    pub releases: Arc<dyn ReleaseStore>,
    pub manifests: Arc<dyn ManifestLoader>,
    pub capacity: Arc<dyn CapacityProvider>,
    pub stacks: Arc<dyn StackUpdater>,
    pub events: Arc<dyn EventSink>,
}

/// Top-level formation operations for apps.
#[derive(Clone)]
pub struct FormationReconciler {
    deps: Collaborators,
}

impl FormationReconciler {
    pub fn new(deps: Collaborators) -> Self {
        Self { deps }
    }

    /// List the formation of every process declared by the app's active
    /// release, in declaration order.
    ///
    /// An app that has never been released has an empty formation.
    pub fn list(&self, app_name: &str) -> FormationResult<Vec<ProcessFormation>> {
        let app = self.deps.apps.get_app(app_name).inspect_err(|e| {
            warn!(app = %app_name, error = %e, "formation list: app lookup failed");
        })?;

        if !app.is_released() {
            debug!(app = %app_name, "app has no release, empty formation");
            return Ok(Vec::new());
        }

        let manifest = self.load_manifest(&app)?;

        let formation = manifest
            .services
            .iter()
            .map(|service| assemble(&app, &service.name))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(app = %app_name, error = %e, "formation list failed"))?;

        debug!(app = %app_name, processes = formation.len(), "formation listed");
        Ok(formation)
    }

    /// Get the formation of a single declared process.
    pub fn get(&self, app_name: &str, process: &str) -> FormationResult<ProcessFormation> {
        let app = self.deps.apps.get_app(app_name)?;

        if !app.is_released() {
            return Err(FormationError::NoRelease(app_name.to_string()));
        }

        let manifest = self.load_manifest(&app)?;

        if manifest.service(process).is_none() {
            return Err(FormationError::NoSuchProcess(process.to_string()));
        }

        Ok(assemble(&app, process)?)
    }

    /// Validate a requested formation and submit it to the stack engine.
    ///
    /// The encoding scheme already used by the app's stack is kept. A
    /// `release:scale` event is published before the update regardless of
    /// its outcome.
    pub fn save(&self, app_name: &str, pf: &ProcessFormation) -> FormationResult<()> {
        let app = self.deps.apps.get_app(app_name)?;
        let capacity = self.deps.capacity.capacity()?;

        if let Err(e) = validate(pf, &capacity) {
            debug!(app = %app_name, process = %pf.name, error = %e, "formation rejected");
            return Err(e.into());
        }

        let settings = ScaleSettings {
            count: pf.count,
            cpu: pf.cpu,
            memory: pf.memory,
        };
        let patch = codec::encode(&app.parameters, &pf.name, settings);

        self.deps.events.send(Event::scale(&app.name, &app.release));

        let stack = app.stack_name();
        debug!(%stack, process = %pf.name, ?patch, "submitting formation patch");

        match self.deps.stacks.update(&stack, KEEP_TEMPLATE, &patch) {
            Ok(()) => {
                info!(
                    app = %app_name,
                    process = %pf.name,
                    count = pf.count,
                    cpu = pf.cpu,
                    memory = pf.memory,
                    "formation saved"
                );
                Ok(())
            }
            Err(e) => match classify(&e) {
                Some(kind) => {
                    warn!(app = %app_name, ?kind, error = %e, "formation update refused");
                    Err(FormationError::conflict(kind, app_name))
                }
                None => {
                    error!(app = %app_name, %stack, error = %e, "stack update failed");
                    Err(e.into())
                }
            },
        }
    }

    fn load_manifest(&self, app: &App) -> FormationResult<Manifest> {
        let release = self.deps.releases.get_release(&app.name, &app.release)?;

        self.deps
            .manifests
            .parse(release.manifest.as_bytes())
            .map_err(|source| {
                warn!(app = %app.name, release = %release.id, error = %source, "bad manifest");
                FormationError::Manifest {
                    release: release.id.clone(),
                    source,
                }
            })
    }
}
