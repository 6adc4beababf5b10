// ============================================================================
// Module : api
// ============================================================================
// Ce module contient tous les clients vers les fournisseurs amont :
// prix (CoinGecko, DexScreener), chandelles (CoinGecko), soldes (RPC Solana)
// ============================================================================

pub mod coingecko;    // Prix groupés + chandelles OHLC
pub mod dexscreener;  // Prix par symbole (repli)
pub mod solana;       // Soldes via JSON-RPC
pub mod upstream;     // Requête HTTP + délai + parsing JSON

// Re-export des types principaux
pub use coingecko::CoinGecko;
pub use dexscreener::DexScreener;
pub use solana::{resolve_balance, SolanaRpc};
pub use upstream::UpstreamClient;
