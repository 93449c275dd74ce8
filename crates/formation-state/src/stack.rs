//! LocalStack — a stack engine that applies parameter patches to the apps
//! held in a `StateStore`.
//!
//! Reports refusals the way a hosted infrastructure engine does: as
//! validation errors with a free-text message.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use formation_core::{ParameterPatch, StackError, StackUpdater};

use crate::store::{StackPatch, StateStore};

/// Stack engine backed by the local state store.
#[derive(Clone)]
pub struct LocalStack {
    store: StateStore,
    /// Stacks with an update currently being applied.
    updating: Arc<Mutex<HashSet<String>>>,
}

impl LocalStack {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            updating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Mark `stack` as updating. Fails if it already is.
    fn begin(&self, stack: &str) -> Result<(), StackError> {
        let mut updating = self
            .updating
            .lock()
            .map_err(|e| StackError::Other(e.to_string()))?;

        if !updating.insert(stack.to_string()) {
            return Err(StackError::Validation(format!(
                "Stack:{stack} is in UPDATE_IN_PROGRESS state and can not be updated."
            )));
        }
        Ok(())
    }

    fn finish(&self, stack: &str) {
        if let Ok(mut updating) = self.updating.lock() {
            updating.remove(stack);
        }
    }

    fn apply(&self, stack: &str, patch: &ParameterPatch) -> Result<(), StackError> {
        let outcome = self
            .store
            .patch_stack(stack, patch)
            .map_err(|e| StackError::Other(e.to_string()))?;

        match outcome {
            StackPatch::Applied { app } => {
                info!(%stack, %app, parameters = patch.len(), "stack parameters updated");
                Ok(())
            }
            StackPatch::Unchanged => Err(StackError::Validation(
                "No updates are to be performed.".to_string(),
            )),
            StackPatch::UnknownStack => Err(StackError::Validation(format!(
                "Stack with id {stack} does not exist"
            ))),
        }
    }
}

impl StackUpdater for LocalStack {
    fn update(
        &self,
        stack: &str,
        template: &str,
        patch: &ParameterPatch,
    ) -> Result<(), StackError> {
        if !template.is_empty() {
            return Err(StackError::Other(
                "template replacement is not supported by the local stack engine".to_string(),
            ));
        }

        self.begin(stack)?;
        let result = self.apply(stack, patch);
        self.finish(stack);

        debug!(%stack, ok = result.is_ok(), "stack update finished");
        result
    }
}
