// ============================================================================
// Agrégateur de prix : chaîne de fournisseurs avec repli
// ============================================================================
// Chaque source est interrogée dans l'ordre, uniquement pour les symboles
// encore manquants. Le premier prix valide gagne pour chaque symbole.
// Les symboles restants après la dernière source valent {0, 0}.
//
// CONCEPTS RUST :
// 1. Trait objects : Vec<Arc<dyn PriceSource>> = liste ordonnée de stratégies
// 2. async-trait : méthodes async dans un trait object
// 3. join_all : toutes les futures avancent en même temps (pas de thread)
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::error::UpstreamError;
use crate::models::{Candle, MarketSnapshot, PriceQuote};

/// Source capable de fournir plusieurs prix en un appel
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Nom court pour les logs et les notes d'erreur
    fn name(&self) -> &str;

    /// Prix des symboles demandés
    ///
    /// Un symbole absent de la map n'a pas été trouvé par cette source.
    async fn fetch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceQuote>, UpstreamError>;
}

/// Source interrogée symbole par symbole (endpoint de ticker)
#[async_trait]
pub trait SymbolPriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, UpstreamError>;
}

/// Source de chandelles historiques
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_candles(&self, symbol: &str, days: u32) -> Result<Vec<Candle>, UpstreamError>;
}

/// Adapte une SymbolPriceSource en PriceSource
///
/// Les requêtes par symbole partent en parallèle : la durée totale est
/// d'environ un aller-retour, quel que soit le nombre de symboles.
pub struct PerSymbol<S>(pub S);

#[async_trait]
impl<S: SymbolPriceSource> PriceSource for PerSymbol<S> {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn fetch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceQuote>, UpstreamError> {
        let branches = symbols.iter().map(|symbol| async move {
            (symbol, self.0.fetch_quote(symbol).await)
        });

        let mut quotes = HashMap::new();
        let mut last_error = None;

        // Chaque échec est converti ici, avant la jonction
        for (symbol, result) in join_all(branches).await {
            match result {
                Ok(quote) => {
                    quotes.insert(symbol.clone(), quote);
                }
                Err(e) => {
                    warn!(source = self.0.name(), symbol = %symbol, kind = e.kind(), error = %e, "Symbol quote failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if quotes.is_empty() => Err(e),
            _ => Ok(quotes),
        }
    }
}

/// Chaîne ordonnée de sources de prix
pub struct PriceAggregator {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceAggregator {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    /// Résout le prix de chaque symbole
    ///
    /// Ne renvoie jamais d'erreur : le snapshot contient une entrée par
    /// symbole demandé, éventuellement par défaut, et une note de
    /// dégradation dans `error`.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn get_prices(&self, symbols: &[String]) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::default();
        let mut missing: Vec<String> = symbols.to_vec();
        let mut diagnostics = Vec::new();

        for source in &self.sources {
            if missing.is_empty() {
                break;
            }

            debug!(source = source.name(), symbols = ?missing, "Querying price source");
            match source.fetch_quotes(&missing).await {
                Ok(mut quotes) => {
                    missing.retain(|symbol| match quotes.remove(symbol) {
                        Some(quote) => {
                            snapshot.quotes.insert(symbol.clone(), quote);
                            false
                        }
                        None => true,
                    });
                    if !missing.is_empty() {
                        diagnostics.push(format!("{} : pas de prix pour {}", source.name(), missing.join(", ")));
                    }
                }
                Err(e) => {
                    warn!(source = source.name(), kind = e.kind(), error = %e, "Price source failed");
                    diagnostics.push(format!("{} : {}", source.name(), e));
                }
            }
        }

        if !missing.is_empty() {
            warn!(symbols = ?missing, "No source could price symbols, using defaults");
            for symbol in &missing {
                snapshot
                    .quotes
                    .insert(symbol.clone(), PriceQuote::unavailable(symbol.as_str()));
            }
            snapshot.error = Some(format!(
                "prix indisponibles pour {} ({})",
                missing.join(", "),
                diagnostics.join(" ; ")
            ));
        }

        info!(quotes = snapshot.len(), degraded = snapshot.is_degraded(), "Market snapshot assembled");
        snapshot
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    /// Source groupée avec des prix fixes ; les autres symboles sont absents
    struct FixedBatch {
        prices: Vec<(&'static str, f64)>,
    }

    #[async_trait]
    impl PriceSource for FixedBatch {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_quotes(
            &self,
            symbols: &[String],
        ) -> Result<HashMap<String, PriceQuote>, UpstreamError> {
            Ok(self
                .prices
                .iter()
                .filter(|(sym, _)| symbols.iter().any(|s| s == sym))
                .map(|(sym, price)| (sym.to_string(), PriceQuote::new(*sym, *price, 1.0)))
                .collect())
        }
    }

    struct Down;

    #[async_trait]
    impl PriceSource for Down {
        fn name(&self) -> &str {
            "down"
        }

        async fn fetch_quotes(
            &self,
            _symbols: &[String],
        ) -> Result<HashMap<String, PriceQuote>, UpstreamError> {
            Err(UpstreamError::Transport {
                url: "http://down".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    /// Ticker lent : chaque appel attend `delay`, SOL échoue
    struct SlowTicker {
        delay: Duration,
    }

    #[async_trait]
    impl SymbolPriceSource for SlowTicker {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, UpstreamError> {
            tokio::time::sleep(self.delay).await;
            if symbol == "SOL" {
                return Err(UpstreamError::NotFound("SOL".to_string()));
            }
            Ok(PriceQuote::new(symbol, 42.0, -2.0))
        }
    }

    fn symbols() -> Vec<String> {
        vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()]
    }

    #[tokio::test]
    async fn test_primary_success() {
        let aggregator = PriceAggregator::new(vec![Arc::new(FixedBatch {
            prices: vec![("BTC", 100.0), ("ETH", 10.0), ("SOL", 1.0)],
        })]);

        let snapshot = aggregator.get_prices(&symbols()).await;
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.get("BTC").map(|q| q.price), Some(100.0));
    }

    #[tokio::test]
    async fn test_fallback_fills_missing_symbols_only() {
        let aggregator = PriceAggregator::new(vec![
            Arc::new(FixedBatch { prices: vec![("BTC", 100.0)] }),
            Arc::new(FixedBatch { prices: vec![("BTC", 999.0), ("ETH", 10.0), ("SOL", 1.0)] }),
        ]);

        let snapshot = aggregator.get_prices(&symbols()).await;
        assert_eq!(snapshot.len(), 3);
        // Le premier fournisseur gagne pour BTC
        assert_eq!(snapshot.get("BTC").map(|q| q.price), Some(100.0));
        assert_eq!(snapshot.get("ETH").map(|q| q.price), Some(10.0));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_total_failure_defaults_every_symbol() {
        let aggregator = PriceAggregator::new(vec![Arc::new(Down), Arc::new(Down)]);

        let snapshot = aggregator.get_prices(&symbols()).await;
        assert_eq!(snapshot.len(), 3);
        for symbol in symbols() {
            let quote = snapshot.get(&symbol).unwrap();
            assert_eq!(quote.price, 0.0);
            assert_eq!(quote.change_24h, 0.0);
        }
        assert!(snapshot.error.as_deref().unwrap().contains("down"));
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated_per_symbol() {
        let aggregator = PriceAggregator::new(vec![
            Arc::new(Down),
            Arc::new(PerSymbol(SlowTicker { delay: Duration::from_millis(10) })),
        ]);

        let snapshot = aggregator.get_prices(&symbols()).await;
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("BTC").map(|q| q.price), Some(42.0));
        assert_eq!(snapshot.get("SOL").map(|q| q.price), Some(0.0));
        assert!(snapshot.error.as_deref().unwrap().contains("SOL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_symbol_fallback_is_concurrent() {
        let delay = Duration::from_millis(300);
        let aggregator = PriceAggregator::new(vec![
            Arc::new(Down),
            Arc::new(PerSymbol(SlowTicker { delay })),
        ]);

        let started = tokio::time::Instant::now();
        let snapshot = aggregator.get_prices(&symbols()).await;
        let elapsed = started.elapsed();

        assert_eq!(snapshot.len(), 3);
        // Un aller-retour, pas trois
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "elapsed = {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_per_symbol_all_failed_is_error() {
        let source = PerSymbol(SlowTicker { delay: Duration::ZERO });
        let result = source.fetch_quotes(&["SOL".to_string()]).await;
        assert!(matches!(result, Err(UpstreamError::NotFound(_))));
    }
}
