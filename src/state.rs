// ============================================================================
// Structure : AppState
// ============================================================================
// État partagé par les handlers via axum::extract::State
//
// Immuable : configuration + clients. Rien n'est mis en cache entre deux
// requêtes, chaque appel déclenche de nouvelles requêtes amont.
// ============================================================================

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::{CoinGecko, DexScreener, SolanaRpc, UpstreamClient};
use crate::config::AppConfig;
use crate::market::{HistorySource, PerSymbol, PriceAggregator, PriceSource};

pub struct AppState {
    pub config: AppConfig,
    pub prices: PriceAggregator,
    pub history: Arc<dyn HistorySource>,
    pub solana: SolanaRpc,
}

impl AppState {
    /// Construit les clients amont à partir de la configuration
    ///
    /// Ordre de la chaîne de prix : CoinGecko (groupé, délai principal)
    /// puis DexScreener (par symbole, délai de repli).
    pub fn new(config: AppConfig) -> Result<Arc<Self>> {
        let client = UpstreamClient::new()?;
        let providers = &config.providers;

        let coingecko = Arc::new(CoinGecko::new(
            client.clone(),
            providers.coingecko_url.clone(),
            config.coins.clone(),
            providers.primary_timeout,
        ));
        let dexscreener = DexScreener::new(
            client.clone(),
            providers.dexscreener_url.clone(),
            providers.fallback_timeout,
            providers.preferred_quote.clone(),
            providers.preferred_venue.clone(),
        );

        let sources: Vec<Arc<dyn PriceSource>> = vec![coingecko.clone(), Arc::new(PerSymbol(dexscreener))];
        let solana = SolanaRpc::new(client, config.wallet.rpc_url.clone(), config.wallet.rpc_timeout);

        info!(
            coingecko = %providers.coingecko_url,
            dexscreener = %providers.dexscreener_url,
            rpc = %config.wallet.rpc_url,
            "Upstream providers configured"
        );

        Ok(Arc::new(Self {
            prices: PriceAggregator::new(sources),
            history: coingecko,
            solana,
            config,
        }))
    }
}
