// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Fournisseur principal :
// - /simple/price      : prix + variation 24h de tous les symboles en un appel
// - /coins/{id}/ohlc   : chandelles sur N jours (historique, indicateurs)
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::upstream::{join_url, UpstreamClient};
use crate::config::CoinTable;
use crate::error::UpstreamError;
use crate::market::{HistorySource, PriceSource};
use crate::models::{Candle, PriceQuote};

// ============================================================================
// Structures pour parser la réponse JSON de CoinGecko
// ============================================================================

/// Entrée de /simple/price : {"bitcoin": {"usd": 67000.0, "usd_24h_change": 1.2}}
#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

/// Ligne de /ohlc : [timestamp_ms, open, high, low, close]
type OhlcRow = Vec<f64>;

#[derive(Debug, Clone)]
pub struct CoinGecko {
    client: UpstreamClient,
    base_url: String,
    coins: CoinTable,
    timeout: Duration,
}

impl CoinGecko {
    pub fn new(
        client: UpstreamClient,
        base_url: impl Into<String>,
        coins: CoinTable,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            coins,
            timeout,
        }
    }

    fn simple_price_url(&self, ids: &[&str]) -> String {
        join_url(
            &self.base_url,
            &format!(
                "simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
                ids.join(",")
            ),
        )
    }

    fn ohlc_url(&self, coin_id: &str, days: u32) -> String {
        join_url(
            &self.base_url,
            &format!("coins/{}/ohlc?vs_currency=usd&days={}", coin_id, days),
        )
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    fn name(&self) -> &str {
        "coingecko"
    }

    #[instrument(skip(self), fields(source = "coingecko"))]
    async fn fetch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceQuote>, UpstreamError> {
        // Seuls les symboles connus de la table sont demandés
        let known: Vec<(&String, &str)> = symbols
            .iter()
            .filter_map(|sym| self.coins.lookup(sym).map(|id| (sym, id)))
            .collect();

        if known.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<&str> = known.iter().map(|(_, id)| *id).collect();
        let url = self.simple_price_url(&ids);
        let body: HashMap<String, SimplePrice> = self.client.get_json(&url, self.timeout).await?;

        let quotes = parse_simple_prices(&known, &body);
        debug!(requested = symbols.len(), priced = quotes.len(), "Parsed CoinGecko prices");
        Ok(quotes)
    }
}

/// Associe chaque symbole à son entrée ; une entrée sans prix est ignorée
fn parse_simple_prices(
    known: &[(&String, &str)],
    body: &HashMap<String, SimplePrice>,
) -> HashMap<String, PriceQuote> {
    known
        .iter()
        .filter_map(|(symbol, id)| {
            let entry = body.get(*id)?;
            let price = entry.usd?;
            Some((
                symbol.to_string(),
                PriceQuote::new(symbol.as_str(), price, entry.usd_24h_change.unwrap_or(0.0)),
            ))
        })
        .collect()
}

#[async_trait]
impl HistorySource for CoinGecko {
    #[instrument(skip(self), fields(source = "coingecko"))]
    async fn fetch_candles(&self, symbol: &str, days: u32) -> Result<Vec<Candle>, UpstreamError> {
        let coin_id = self.coins.id_or_default(symbol);
        let url = self.ohlc_url(coin_id, days);
        debug!(url = %url, coin_id = %coin_id, "Built CoinGecko OHLC URL");

        let rows: Vec<OhlcRow> = self.client.get_json(&url, self.timeout).await?;
        let candles = parse_ohlc_rows(&rows);

        info!(candles = candles.len(), "Successfully fetched candles");
        Ok(candles)
    }
}

/// Convertit les lignes brutes en chandelles, dans l'ordre reçu
///
/// CoinGecko ne donne pas de volume sur cet endpoint : volume = 0.
fn parse_ohlc_rows(rows: &[OhlcRow]) -> Vec<Candle> {
    let mut skipped = 0;
    let mut candles = Vec::with_capacity(rows.len());

    for row in rows {
        let (ts, open, high, low, close) = match row.as_slice() {
            [ts, open, high, low, close, ..] => (*ts, *open, *high, *low, *close),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let Some(open_time) = DateTime::from_timestamp_millis(ts as i64) else {
            skipped += 1;
            continue;
        };

        candles.push(Candle::new(open_time, open, high, low, close, 0.0));
    }

    if skipped > 0 {
        warn!(skipped = skipped, total = rows.len(), "Skipped malformed OHLC rows");
    }
    candles
}

// ============================================================================
// Tests unitaires
// ============================================================================
