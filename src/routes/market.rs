// ============================================================================
// Routes : marché et portefeuille
// ============================================================================
// Réponses toujours 200 : les échecs amont sont signalés dans le corps
// ============================================================================

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::resolve_balance;
use crate::routes::iso_now;
use crate::state::AppState;

/// GET /api/market
///
/// Toujours 200 : les symboles sans prix valent {0, 0} et `error` décrit
/// la dégradation.
pub async fn api_market(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.prices.get_prices(&state.config.symbols).await;

    let mut body = json!({
        "success": true,
        "data": snapshot.quotes,
        "timestamp": iso_now(),
    });
    if let Some(error) = snapshot.error {
        body["error"] = Value::String(error);
    }
    Json(body)
}

/// GET /api/wallet
pub async fn api_wallet(State(state): State<Arc<AppState>>) -> Json<Value> {
    let wallet = &state.config.wallet;
    let balance = resolve_balance(&state.solana, wallet).await;

    Json(json!({
        "success": true,
        "address": wallet.address,
        "data": balance,
        "timestamp": iso_now(),
    }))
}
