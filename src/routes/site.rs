// ============================================================================
// Routes : page du tableau de bord, statut, 404
// ============================================================================

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

/// GET / et /index.html : page statique du tableau de bord
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let path = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(path = ?path, error = %e, "Failed to load index page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading page").into_response()
        }
    }
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let identity = &state.config.identity;
    Json(json!({
        "name": identity.name,
        "status": "online",
        "born": identity.born,
        "message": identity.message,
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
