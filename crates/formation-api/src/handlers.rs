//! REST API handlers.
//!
//! Record handlers read/write via `StateStore`; formation handlers go
//! through the `FormationReconciler`. All return JSON responses.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use formation_core::{App, Manifest, ProviderError, Release};
use formation_engine::FormationError;
use formation_state::StateError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// HTTP status for a formation failure.
pub fn formation_status(err: &FormationError) -> StatusCode {
    match err {
        FormationError::Validation(_) => StatusCode::BAD_REQUEST,
        FormationError::NoUpdates { .. } | FormationError::AlreadyUpdating { .. } => {
            StatusCode::CONFLICT
        }
        FormationError::Format(_) | FormationError::Manifest { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        FormationError::Provider(_) | FormationError::Stack(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn formation_error(err: FormationError) -> Response {
    error_response(&err.to_string(), formation_status(&err))
}

/// HTTP status for a state store failure.
pub fn state_status(err: &StateError) -> StatusCode {
    match err {
        StateError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StateError::StackTaken { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn state_error(err: StateError) -> Response {
    error_response(&err.to_string(), state_status(&err))
}

// ── Apps ───────────────────────────────────────────────────────

/// GET /api/v1/apps
pub async fn list_apps(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_apps() {
        Ok(apps) => ApiResponse::ok(apps).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// PUT /api/v1/apps/:app
///
/// The path name wins over any name in the body.
pub async fn put_app(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(mut app): Json<App>,
) -> impl IntoResponse {
    app.name = name;
    match state.store.put_app(&app) {
        Ok(()) => ApiResponse::ok(app).into_response(),
        Err(e) => state_error(e),
    }
}

// ── Releases ───────────────────────────────────────────────────

/// Release request body.
#[derive(serde::Deserialize)]
pub struct ReleaseRequest {
    pub manifest: String,
    /// Make this the app's active release.
    #[serde(default = "default_promote")]
    pub promote: bool,
}

fn default_promote() -> bool {
    true
}

/// PUT /api/v1/apps/:app/releases/:id
pub async fn put_release(
    State(state): State<ApiState>,
    Path((app_name, id)): Path<(String, String)>,
    Json(req): Json<ReleaseRequest>,
) -> impl IntoResponse {
    if let Err(e) = Manifest::load(req.manifest.as_bytes()) {
        return error_response(&e.to_string(), StatusCode::BAD_REQUEST);
    }

    let release = Release {
        id,
        app: app_name,
        manifest: req.manifest,
        created_at: epoch_secs(),
    };

    let stored = if req.promote {
        state.store.promote_release(&release)
    } else {
        match state.store.get_app(&release.app) {
            Ok(Some(_)) => state.store.put_release(&release).map(|()| true),
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        }
    };

    match stored {
        Ok(true) => {}
        Ok(false) => {
            let err = ProviderError::not_found("app", release.app);
            return error_response(&err.to_string(), StatusCode::NOT_FOUND);
        }
        Err(e) => return state_error(e),
    }
    debug!(app = %release.app, release = %release.id, promoted = req.promote, "release stored");

    (StatusCode::CREATED, ApiResponse::ok(release)).into_response()
}

// ── Formation ──────────────────────────────────────────────────

/// GET /api/v1/apps/:app/formation
pub async fn list_formation(
    State(state): State<ApiState>,
    Path(app): Path<String>,
) -> impl IntoResponse {
    match state.formations.list(&app) {
        Ok(formation) => ApiResponse::ok(formation).into_response(),
        Err(e) => formation_error(e),
    }
}

/// GET /api/v1/apps/:app/formation/:process
pub async fn get_formation(
    State(state): State<ApiState>,
    Path((app, process)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.formations.get(&app, &process) {
        Ok(pf) => ApiResponse::ok(pf).into_response(),
        Err(e) => formation_error(e),
    }
}

/// Formation change request body. Omitted fields keep their current value.
#[derive(Debug, Default, serde::Deserialize)]
pub struct FormationRequest {
    pub count: Option<i64>,
    pub cpu: Option<i64>,
    pub memory: Option<i64>,
}

/// POST /api/v1/apps/:app/formation/:process
pub async fn save_formation(
    State(state): State<ApiState>,
    Path((app, process)): Path<(String, String)>,
    Json(req): Json<FormationRequest>,
) -> impl IntoResponse {
    let mut pf = match state.formations.get(&app, &process) {
        Ok(pf) => pf,
        Err(e) => return formation_error(e),
    };

    if let Some(count) = req.count {
        pf.count = count;
    }
    if let Some(cpu) = req.cpu {
        pf.cpu = cpu;
    }
    if let Some(memory) = req.memory {
        pf.memory = memory;
    }

    match state.formations.save(&app, &pf) {
        Ok(()) => ApiResponse::ok(pf).into_response(),
        Err(e) => formation_error(e),
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
