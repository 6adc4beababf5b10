// ============================================================================
// LazyMarket - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;         // Clients amont (CoinGecko, DexScreener, RPC Solana)
pub mod config;      // Configuration immuable
pub mod error;       // Erreurs typées
pub mod indicators;  // MA / RSI
pub mod market;      // Chaîne de fournisseurs de prix
pub mod models;      // Structures de données
pub mod routes;      // Réponses HTTP
pub mod state;       // État partagé des handlers
