//! StateStore — redb-backed persistence for apps and releases.
//!
//! Provides typed CRUD operations over apps and their release snapshots.
//! All values are JSON-serialized into redb's `&[u8]` value columns. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use formation_core::{
    App, AppStore, ParameterPatch, ProviderError, Release, ReleaseStore, release_key,
};

use crate::error::{StateError, StateResult};
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(APPS).map_err(map_err!(Table))?;
        txn.open_table(RELEASES).map_err(map_err!(Table))?;
        txn.open_table(STACKS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Apps ───────────────────────────────────────────────────────

    /// Insert or update an app.
    ///
    /// The app's stack name is indexed in the same transaction. Fails if
    /// another app already owns that stack name.
    pub fn put_app(&self, app: &App) -> StateResult<()> {
        if app.name.is_empty() || app.name.contains(':') {
            return Err(StateError::InvalidName(app.name.clone()));
        }
        let value = serde_json::to_vec(app).map_err(map_err!(Serialize))?;
        let stack = app.stack_name();

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut apps = txn.open_table(APPS).map_err(map_err!(Table))?;
            let mut stacks = txn.open_table(STACKS).map_err(map_err!(Table))?;

            let owner = stacks
                .get(stack.as_str())
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_string());
            if let Some(owner) = owner.filter(|owner| *owner != app.name) {
                return Err(StateError::StackTaken { stack, app: owner });
            }

            let previous = match apps.get(app.name.as_str()).map_err(map_err!(Read))? {
                Some(guard) => Some(
                    serde_json::from_slice::<App>(guard.value())
                        .map_err(map_err!(Deserialize))?
                        .stack_name(),
                ),
                None => None,
            };
            if let Some(previous) = previous.filter(|previous| *previous != stack) {
                stacks.remove(previous.as_str()).map_err(map_err!(Write))?;
            }

            stacks
                .insert(stack.as_str(), app.name.as_str())
                .map_err(map_err!(Write))?;
            apps.insert(app.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(app = %app.name, %stack, "app stored");
        Ok(())
    }

    /// Get an app by name.
    pub fn get_app(&self, name: &str) -> StateResult<Option<App>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(APPS).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let app: App =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(app))
            }
            None => Ok(None),
        }
    }

    /// List all apps, ordered by name.
    pub fn list_apps(&self) -> StateResult<Vec<App>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(APPS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let app: App = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(app);
        }
        Ok(results)
    }

    /// Merge `patch` into the parameters of the app owning `stack`.
    ///
    /// Lookup, comparison and write happen in one write transaction.
    pub fn patch_stack(&self, stack: &str, patch: &ParameterPatch) -> StateResult<StackPatch> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let outcome = {
            let mut apps = txn.open_table(APPS).map_err(map_err!(Table))?;
            let stacks = txn.open_table(STACKS).map_err(map_err!(Table))?;

            let owner = stacks
                .get(stack)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_string());
            let Some(owner) = owner else {
                return Ok(StackPatch::UnknownStack);
            };

            let stored = apps
                .get(owner.as_str())
                .map_err(map_err!(Read))?
                .map(|guard| serde_json::from_slice::<App>(guard.value()));
            let mut app = match stored {
                Some(app) => app.map_err(map_err!(Deserialize))?,
                None => return Ok(StackPatch::UnknownStack),
            };

            let changed = patch
                .iter()
                .any(|(key, value)| app.parameters.get(key) != Some(value));
            if changed {
                app.parameters
                    .extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
                let value = serde_json::to_vec(&app).map_err(map_err!(Serialize))?;
                apps.insert(owner.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
                StackPatch::Applied { app: owner }
            } else {
                StackPatch::Unchanged
            }
        };
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(outcome)
    }

    // ── Releases ───────────────────────────────────────────────────

    /// Insert or update a release.
    pub fn put_release(&self, release: &Release) -> StateResult<()> {
        let key = release.table_key();
        let value = serde_json::to_vec(release).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(RELEASES).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, "release stored");
        Ok(())
    }

    /// Store a release and make it the app's active release, atomically.
    ///
    /// Returns false, storing nothing, if the app does not exist.
    pub fn promote_release(&self, release: &Release) -> StateResult<bool> {
        let key = release.table_key();
        let release_value = serde_json::to_vec(release).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut apps = txn.open_table(APPS).map_err(map_err!(Table))?;
            let stored = apps
                .get(release.app.as_str())
                .map_err(map_err!(Read))?
                .map(|guard| serde_json::from_slice::<App>(guard.value()));
            let mut app = match stored {
                Some(app) => app.map_err(map_err!(Deserialize))?,
                None => return Ok(false),
            };
            app.release = release.id.clone();
            let app_value = serde_json::to_vec(&app).map_err(map_err!(Serialize))?;
            apps.insert(app.name.as_str(), app_value.as_slice())
                .map_err(map_err!(Write))?;

            let mut releases = txn.open_table(RELEASES).map_err(map_err!(Table))?;
            releases
                .insert(key.as_str(), release_value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, "release promoted");
        Ok(true)
    }

    /// Get a release of an app.
    pub fn get_release(&self, app: &str, id: &str) -> StateResult<Option<Release>> {
        let key = release_key(app, id);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RELEASES).map_err(map_err!(Table))?;
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let release: Release =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(release))
            }
            None => Ok(None),
        }
    }
}

/// Result of [`StateStore::patch_stack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackPatch {
    /// The patch changed the named app's parameters.
    Applied { app: String },
    /// Every patched key already held the patched value.
    Unchanged,
    UnknownStack,
}

impl AppStore for StateStore {
    fn get_app(&self, name: &str) -> Result<App, ProviderError> {
        StateStore::get_app(self, name)?.ok_or_else(|| ProviderError::not_found("app", name))
    }
}

impl ReleaseStore for StateStore {
    fn get_release(&self, app: &str, id: &str) -> Result<Release, ProviderError> {
        StateStore::get_release(self, app, id)?
            .ok_or_else(|| ProviderError::not_found("release", release_key(app, id)))
    }
}
