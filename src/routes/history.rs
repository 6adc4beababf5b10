// ============================================================================
// Routes : historique et indicateurs
// ============================================================================
// /api/history/:symbol renvoie les chandelles brutes de la période demandée.
// /api/indicators/:symbol calcule MA / RSI sur l'historique récent et répond
// toujours 200, même sans données.
// ============================================================================

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::indicators::{round2, IndicatorSet};
use crate::models::{closing_prices, CandleSeries, HistoryPeriod};
use crate::routes::epoch_ms_now;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    period: Option<String>,
}

/// GET /api/history/:symbol?period=1d|7d|30d|90d
///
/// Seul endpoint qui renvoie une erreur (500) : il n'existe pas de série
/// par défaut.
pub async fn api_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<CandleSeries>, ApiError> {
    let symbol = symbol.to_uppercase();
    let period = HistoryPeriod::from_token(q.period.as_deref().unwrap_or_default());

    let candles = state
        .history
        .fetch_candles(&symbol, period.to_days())
        .await?;

    debug!(symbol = %symbol, period = ?period, candles = candles.len(), "History served");
    Ok(Json(CandleSeries::new(symbol, period, candles)))
}

/// GET /api/indicators/:symbol
///
/// Toujours 200. Si l'historique est indisponible, prix à 0, indicateurs
/// à null et `error` renseigné.
pub async fn api_indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Json<Value> {
    let symbol = symbol.to_uppercase();

    let (closes, error) = match state
        .history
        .fetch_candles(&symbol, state.config.indicator_lookback_days)
        .await
    {
        Ok(candles) => (closing_prices(&candles), None),
        Err(e) => {
            warn!(symbol = %symbol, kind = e.kind(), error = %e, "Indicators computed without history");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let set = IndicatorSet::standard(&closes);

    let mut body = json!({
        "symbol": symbol,
        "price": round2(set.latest_price),
        "indicators": indicators_json(&set),
        "timestamp": epoch_ms_now(),
    });
    if let Some(error) = error {
        body["error"] = Value::String(error);
    }
    Json(body)
}

/// {"ma": {"ma7": .., "ma20": .., "ma50": ..}, "rsi": {"rsi14": ..}}
fn indicators_json(set: &IndicatorSet) -> Value {
    let group = |prefix: &str, values: &std::collections::BTreeMap<usize, Option<f64>>| {
        values
            .iter()
            .map(|(period, value)| (format!("{}{}", prefix, period), json!(value.map(round2))))
            .collect::<Map<String, Value>>()
    };

    json!({
        "ma": group("ma", &set.sma),
        "rsi": group("rsi", &set.rsi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_json_shape() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 / 3.0).collect();
        let value = indicators_json(&IndicatorSet::standard(&closes));

        assert_eq!(value["ma"]["ma7"], json!(round2(sma7(&closes))));
        assert!(value["ma"]["ma20"].is_number());
        assert!(value["ma"]["ma50"].is_null());
        assert_eq!(value["rsi"]["rsi14"], 100.0);
    }

    fn sma7(closes: &[f64]) -> f64 {
        crate::indicators::sma(closes, 7).unwrap()
    }
}
