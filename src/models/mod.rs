// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'API
// Elles sont créées à chaque requête et jamais persistées
// ============================================================================

pub mod ohlc;    // Chandelles et périodes d'historique
pub mod quote;   // Prix courants
pub mod wallet;  // Soldes du portefeuille

// Re-export des structures principales pour simplifier les imports
pub use ohlc::{closing_prices, Candle, CandleSeries, HistoryPeriod};
pub use quote::{MarketSnapshot, PriceQuote};
pub use wallet::WalletBalance;
