// ============================================================================
// API Client : DexScreener
// ============================================================================
// Fournisseur de repli, interrogé symbole par symbole :
//   GET /latest/dex/search?q=SOL
// La recherche est approximative : elle renvoie aussi des paires où le
// symbole est la cotation, ou un simple fragment d'un autre nom. Seules les
// paires dont le token de base porte exactement le symbole sont retenues.
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::api::upstream::{join_url, UpstreamClient};
use crate::error::UpstreamError;
use crate::market::SymbolPriceSource;
use crate::models::PriceQuote;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default)]
    dex_id: String,
    #[serde(default)]
    base_token: Token,
    #[serde(default)]
    quote_token: Token,
    /// Prix en USD, sous forme de chaîne
    price_usd: Option<String>,
    #[serde(default)]
    price_change: PriceChange,
}

#[derive(Debug, Default, Deserialize)]
struct Token {
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Default, Deserialize)]
struct PriceChange {
    h24: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DexScreener {
    client: UpstreamClient,
    base_url: String,
    timeout: Duration,
    preferred_quote: String,
    preferred_venue: String,
}

impl DexScreener {
    pub fn new(
        client: UpstreamClient,
        base_url: impl Into<String>,
        timeout: Duration,
        preferred_quote: impl Into<String>,
        preferred_venue: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
            preferred_quote: preferred_quote.into(),
            preferred_venue: preferred_venue.into(),
        }
    }

    /// URL de recherche, symbole encodé dans la query string
    fn search_url(&self, symbol: &str) -> Result<String, UpstreamError> {
        let endpoint = join_url(&self.base_url, "latest/dex/search");
        reqwest::Url::parse_with_params(&endpoint, &[("q", symbol)])
            .map(String::from)
            .map_err(|e| UpstreamError::invalid(&endpoint, e.to_string()))
    }
}

/// Choisit la paire à utiliser pour `base`
///
/// Parmi les paires dont le token de base est `base` : la première cotée
/// dans le stablecoin préféré ET sur la venue préférée, sinon la première.
fn select_pair<'a>(pairs: &'a [Pair], base: &str, quote: &str, venue: &str) -> Option<&'a Pair> {
    let mut candidates = pairs
        .iter()
        .filter(|p| p.base_token.symbol.eq_ignore_ascii_case(base));

    let first = candidates.next()?;
    if is_preferred(first, quote, venue) {
        return Some(first);
    }
    candidates
        .find(|p| is_preferred(p, quote, venue))
        .or(Some(first))
}

fn is_preferred(pair: &Pair, quote: &str, venue: &str) -> bool {
    pair.quote_token.symbol.eq_ignore_ascii_case(quote) && pair.dex_id.eq_ignore_ascii_case(venue)
}

#[async_trait]
impl SymbolPriceSource for DexScreener {
    fn name(&self) -> &str {
        "dexscreener"
    }

    #[instrument(skip(self), fields(source = "dexscreener"))]
    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, UpstreamError> {
        let url = self.search_url(symbol)?;
        let body: SearchResponse = self.client.get_json(&url, self.timeout).await?;
        let pairs = body.pairs.unwrap_or_default();

        let pair = select_pair(&pairs, symbol, &self.preferred_quote, &self.preferred_venue)
            .ok_or_else(|| UpstreamError::NotFound(format!("aucune paire de base {}", symbol)))?;

        let price = pair
            .price_usd
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .ok_or_else(|| UpstreamError::invalid(&url, format!("priceUsd illisible pour {}", symbol)))?;

        debug!(dex = %pair.dex_id, quote = %pair.quote_token.symbol, price = price, "Selected pair");
        Ok(PriceQuote::new(symbol, price, pair.price_change.h24.unwrap_or(0.0)))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
