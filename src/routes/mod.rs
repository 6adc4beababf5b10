// ============================================================================
// Module : routes
// ============================================================================
// Assemble les réponses JSON exposées par le serveur
// ============================================================================

pub mod history;  // /api/history, /api/indicators
pub mod market;   // /api/market, /api/wallet
pub mod site;     // /, /index.html, /api/status, 404

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::{SecondsFormat, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Routeur complet de l'application
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(site::index))
        .route("/index.html", get(site::index))
        .route("/api/status", get(site::status))
        .route("/api/market", get(market::api_market))
        .route("/api/wallet", get(market::api_wallet))
        .route("/api/history/:symbol", get(history::api_history))
        .route("/api/indicators/:symbol", get(history::api_indicators))
        .fallback(site::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Horodatage ISO8601 (millisecondes, suffixe Z)
pub(crate) fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Horodatage epoch en millisecondes
pub(crate) fn epoch_ms_now() -> i64 {
    Utc::now().timestamp_millis()
}
