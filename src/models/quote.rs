// ============================================================================
// Structures : PriceQuote / MarketSnapshot
// ============================================================================
// Prix courant + variation 24h d'un symbole, et l'ensemble des prix
// renvoyés par /api/market
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

/// Prix d'un symbole à l'instant de la requête
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Symbole (ex: "BTC", "SOL")
    pub symbol: String,

    /// Prix en USD, jamais négatif
    pub price: f64,

    /// Variation sur 24h en pourcentage (signée)
    #[serde(rename = "change24h")]
    pub change_24h: f64,
}

impl PriceQuote {
    /// Crée un prix ; un prix négatif ou non fini est ramené à 0
    pub fn new(symbol: impl Into<String>, price: f64, change_24h: f64) -> Self {
        let price = if price.is_finite() { price.max(0.0) } else { 0.0 };
        let change_24h = if change_24h.is_finite() { change_24h } else { 0.0 };
        Self {
            symbol: symbol.into(),
            price,
            change_24h,
        }
    }

    /// Valeur par défaut quand aucun fournisseur n'a répondu
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0.0, 0.0)
    }
}

/// Prix de tous les symboles demandés
///
/// Contient toujours une entrée par symbole, même si tous les fournisseurs
/// ont échoué (valeur par défaut, jamais d'omission).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketSnapshot {
    pub quotes: BTreeMap<String, PriceQuote>,

    /// Note de dégradation si au moins un symbole a été mis par défaut
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MarketSnapshot {
    pub fn get(&self, symbol: &str) -> Option<&PriceQuote> {
        self.quotes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_is_clamped() {
        let quote = PriceQuote::new("BTC", -12.0, -3.5);
        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.change_24h, -3.5);
    }

    #[test]
    fn test_unavailable_is_zeroed() {
        let quote = PriceQuote::unavailable("ETH");
        assert_eq!(quote.symbol, "ETH");
        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.change_24h, 0.0);
    }

    #[test]
    fn test_quote_json_field_names() {
        let json = serde_json::to_value(PriceQuote::new("SOL", 150.25, 1.5)).unwrap();
        assert_eq!(json["price"], 150.25);
        assert_eq!(json["change24h"], 1.5);
    }
}
