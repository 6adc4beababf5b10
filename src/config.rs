// ============================================================================
// Module : config
// ============================================================================
// Configuration immuable construite une seule fois au démarrage (main.rs)
// puis passée explicitement à AppState. Aucune variable globale.
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Mint SPL de l'USDT sur Solana
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

/// Identifiant CoinGecko utilisé pour un symbole inconnu
pub const DEFAULT_COIN_ID: &str = "bitcoin";

/// Symboles exposés par /api/market
pub const MARKET_SYMBOLS: [&str; 3] = ["BTC", "ETH", "SOL"];

/// Table fixe symbole -> identifiant CoinGecko
#[derive(Debug, Clone)]
pub struct CoinTable {
    entries: Vec<(String, String)>,
    default_id: String,
}

impl CoinTable {
    /// Identifiant du symbole, None s'il n'est pas dans la table
    pub fn lookup(&self, symbol: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(sym, _)| sym.eq_ignore_ascii_case(symbol))
            .map(|(_, id)| id.as_str())
    }

    /// Identifiant du symbole, ou l'identifiant par défaut
    pub fn id_or_default(&self, symbol: &str) -> &str {
        self.lookup(symbol).unwrap_or(&self.default_id)
    }
}

impl Default for CoinTable {
    fn default() -> Self {
        let entries = [
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("SOL", "solana"),
            ("USDT", "tether"),
            ("USDC", "usd-coin"),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(sym, id)| (sym.to_string(), id.to_string()))
                .collect(),
            default_id: DEFAULT_COIN_ID.to_string(),
        }
    }
}

/// Portefeuille suivi par /api/wallet
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub address: String,
    pub token_mint: String,
    pub rpc_url: String,
    pub rpc_timeout: Duration,
}

/// URLs et délais des fournisseurs de prix / chandelles
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub coingecko_url: String,
    pub dexscreener_url: String,
    /// Délai du fournisseur principal (prix groupés, chandelles)
    pub primary_timeout: Duration,
    /// Délai plus court pour le repli, pour ne pas allonger la chaîne
    pub fallback_timeout: Duration,
    /// Stablecoin de cotation préféré lors du choix d'une paire
    pub preferred_quote: String,
    /// Venue (dexId) préférée lors du choix d'une paire
    pub preferred_venue: String,
}

/// Réponse de /api/status
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub name: String,
    pub born: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    /// Répertoire contenant index.html
    pub static_dir: PathBuf,
    /// None => répertoire de données utilisateur (voir main.rs)
    pub log_dir: Option<PathBuf>,
    pub symbols: Vec<String>,
    pub coins: CoinTable,
    pub wallet: WalletConfig,
    pub providers: ProviderConfig,
    /// Historique utilisé pour calculer MA / RSI
    pub indicator_lookback_days: u32,
    pub identity: ServiceIdentity,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("static"),
            log_dir: None,
            symbols: MARKET_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            coins: CoinTable::default(),
            wallet: WalletConfig {
                address: String::new(),
                token_mint: USDT_MINT.to_string(),
                rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
                rpc_timeout: Duration::from_millis(10_000),
            },
            providers: ProviderConfig {
                coingecko_url: "https://api.coingecko.com/api/v3".to_string(),
                dexscreener_url: "https://api.dexscreener.com".to_string(),
                primary_timeout: Duration::from_millis(10_000),
                fallback_timeout: Duration::from_millis(5_000),
                preferred_quote: "USDC".to_string(),
                preferred_venue: "raydium".to_string(),
            },
            indicator_lookback_days: 30,
            identity: ServiceIdentity {
                name: "lazymarket".to_string(),
                born: "2026-02-01".to_string(),
                message: "prix, portefeuille et indicateurs en direct".to_string(),
            },
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_str(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_millis(name: &str, default: Duration) -> Duration {
    Duration::from_millis(env_parse(name, default.as_millis() as u64))
}

impl AppConfig {
    /// Lit les variables d'environnement par-dessus les valeurs par défaut
    pub fn from_env() -> Self {
        let d = Self::default();

        Self {
            bind: env_str("BIND", &d.bind),
            port: env_parse("PORT", d.port),
            static_dir: env_opt("STATIC_DIR").map(PathBuf::from).unwrap_or(d.static_dir),
            log_dir: env_opt("LOG_DIR").map(PathBuf::from),
            symbols: d.symbols,
            coins: d.coins,
            wallet: WalletConfig {
                address: env_str("WALLET_ADDRESS", &d.wallet.address),
                token_mint: env_str("TOKEN_MINT", &d.wallet.token_mint),
                rpc_url: env_str("SOLANA_RPC_URL", &d.wallet.rpc_url),
                rpc_timeout: env_millis("RPC_TIMEOUT_MS", d.wallet.rpc_timeout),
            },
            providers: ProviderConfig {
                coingecko_url: env_str("COINGECKO_URL", &d.providers.coingecko_url),
                dexscreener_url: env_str("DEXSCREENER_URL", &d.providers.dexscreener_url),
                primary_timeout: env_millis("PRIMARY_TIMEOUT_MS", d.providers.primary_timeout),
                fallback_timeout: env_millis("FALLBACK_TIMEOUT_MS", d.providers.fallback_timeout),
                preferred_quote: env_str("PREFERRED_QUOTE", &d.providers.preferred_quote),
                preferred_venue: env_str("PREFERRED_VENUE", &d.providers.preferred_venue),
            },
            indicator_lookback_days: env_parse("INDICATOR_LOOKBACK_DAYS", d.indicator_lookback_days),
            identity: ServiceIdentity {
                name: env_str("STATUS_NAME", &d.identity.name),
                born: env_str("STATUS_BORN", &d.identity.born),
                message: env_str("STATUS_MESSAGE", &d.identity.message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_table_lookup() {
        let coins = CoinTable::default();
        assert_eq!(coins.lookup("BTC"), Some("bitcoin"));
        assert_eq!(coins.lookup("sol"), Some("solana"));
        assert_eq!(coins.lookup("DOGE"), None);
    }

    #[test]
    fn test_coin_table_unknown_symbol_falls_back() {
        let coins = CoinTable::default();
        assert_eq!(coins.id_or_default("DOGE"), DEFAULT_COIN_ID);
        assert_eq!(coins.id_or_default("ETH"), "ethereum");
    }

    #[test]
    fn test_default_timeouts() {
        let config = AppConfig::default();
        assert_eq!(config.providers.primary_timeout, Duration::from_millis(10_000));
        assert_eq!(config.providers.fallback_timeout, Duration::from_millis(5_000));
        assert_eq!(config.symbols, vec!["BTC", "ETH", "SOL"]);
    }
}
