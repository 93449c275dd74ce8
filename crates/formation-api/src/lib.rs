//! formation-api — REST API for app formations.
//!
//! Provides axum route handlers for reading and changing the formation of
//! an app's processes, plus the app and release records they are read from.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/apps` | List apps |
//! | PUT | `/api/v1/apps/:app` | Create or replace an app |
//! | PUT | `/api/v1/apps/:app/releases/:id` | Create a release (optionally promote it) |
//! | GET | `/api/v1/apps/:app/formation` | List the app's formation |
//! | GET | `/api/v1/apps/:app/formation/:process` | Get one process's formation |
//! | POST | `/api/v1/apps/:app/formation/:process` | Change one process's formation |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use formation_core::{Capacity, EventSink, TomlManifestLoader};
use formation_engine::{Collaborators, FormationReconciler};
use formation_state::{LocalStack, StateStore};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StateStore,
    pub formations: FormationReconciler,
}

/// Wire a reconciler whose apps, releases and stacks all live in `store`.
pub fn standalone_reconciler(
    store: StateStore,
    capacity: Capacity,
    events: Arc<dyn EventSink>,
) -> FormationReconciler {
    FormationReconciler::new(Collaborators {
        apps: Arc::new(store.clone()),
        releases: Arc::new(store.clone()),
        manifests: Arc::new(TomlManifestLoader),
        capacity: Arc::new(capacity),
        stacks: Arc::new(LocalStack::new(store)),
        events,
    })
}

/// Build the complete API router.
pub fn build_router(store: StateStore, formations: FormationReconciler) -> Router {
    let api_state = ApiState { store, formations };

    let api_routes = Router::new()
        .route("/apps", get(handlers::list_apps))
        .route("/apps/{app}", put(handlers::put_app))
        .route("/apps/{app}/releases/{id}", put(handlers::put_release))
        .route("/apps/{app}/formation", get(handlers::list_formation))
        .route(
            "/apps/{app}/formation/{process}",
            get(handlers::get_formation).post(handlers::save_formation),
        )
        .with_state(api_state);

    Router::new().nest("/api/v1", api_routes)
}
