// ============================================================================
// Client JSON-RPC : nœud Solana
// ============================================================================
// Résout le solde SOL et le solde du token suivi pour une adresse
//
// Deux appels successifs :
// 1. getBalance                -> lamports (entier) / 10^9
// 2. getTokenAccountsByOwner   -> encodage "jsonParsed", premier compte
// ============================================================================

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::api::upstream::UpstreamClient;
use crate::config::WalletConfig;
use crate::error::UpstreamError;
use crate::models::WalletBalance;

// ============================================================================
// Structures pour parser les réponses JSON-RPC
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Enveloppe `{context, value}` des méthodes Solana
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    account: TokenAccountData,
}

#[derive(Debug, Deserialize)]
struct TokenAccountData {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    info: ParsedInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedInfo {
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAmount {
    ui_amount: Option<f64>,
    #[serde(default)]
    ui_amount_string: Option<String>,
}

impl TokenAmount {
    /// uiAmount peut être null pour les gros montants : on relit la chaîne
    fn value(&self) -> f64 {
        self.ui_amount
            .or_else(|| {
                self.ui_amount_string
                    .as_deref()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Client RPC
// ============================================================================

#[derive(Debug, Clone)]
pub struct SolanaRpc {
    client: UpstreamClient,
    endpoint: String,
    timeout: Duration,
}

impl SolanaRpc {
    pub fn new(client: UpstreamClient, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Envoie un appel JSON-RPC 2.0 et extrait `result`
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, UpstreamError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .client
            .post_json(&self.endpoint, &body, self.timeout)
            .await?;

        if let Some(err) = response.error {
            return Err(UpstreamError::invalid(
                &self.endpoint,
                format!("{} (code {}) : {}", method, err.code, err.message),
            ));
        }

        response
            .result
            .ok_or_else(|| UpstreamError::invalid(&self.endpoint, format!("{} : champ result absent", method)))
    }

    /// Solde natif en SOL
    #[instrument(skip(self))]
    pub async fn native_balance(&self, address: &str) -> Result<f64, UpstreamError> {
        let result: WithContext<u64> = self.call("getBalance", json!([address])).await?;
        debug!(lamports = result.value, "Received native balance");
        Ok(WalletBalance::lamports_to_sol(result.value))
    }

    /// Montant lisible du premier compte de token correspondant au mint
    ///
    /// Erreur NotFound si l'adresse ne possède aucun compte pour ce mint.
    #[instrument(skip(self))]
    pub async fn token_balance(&self, owner: &str, mint: &str) -> Result<f64, UpstreamError> {
        let result: WithContext<Vec<TokenAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([owner, { "mint": mint }, { "encoding": "jsonParsed" }]),
            )
            .await?;

        debug!(accounts = result.value.len(), "Received token accounts");
        result
            .value
            .first()
            .map(|acc| acc.account.data.parsed.info.token_amount.value())
            .ok_or_else(|| UpstreamError::NotFound(format!("aucun compte de token {} pour {}", mint, owner)))
    }
}

/// Résout les deux soldes du portefeuille configuré
///
/// Les appels sont séquentiels. Tout échec (hors compte de token absent,
/// qui vaut 0) remet les deux soldes à zéro avec un message d'erreur.
#[instrument(skip_all, fields(address = %wallet.address))]
pub async fn resolve_balance(rpc: &SolanaRpc, wallet: &WalletConfig) -> WalletBalance {
    let native = match rpc.native_balance(&wallet.address).await {
        Ok(sol) => sol,
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Native balance unavailable");
            return WalletBalance::failed(&wallet.address, e.to_string());
        }
    };

    let token = match rpc.token_balance(&wallet.address, &wallet.token_mint).await {
        Ok(amount) => amount,
        Err(UpstreamError::NotFound(reason)) => {
            debug!(%reason, "No token account, defaulting to 0");
            0.0
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Token balance unavailable");
            return WalletBalance::failed(&wallet.address, e.to_string());
        }
    };

    info!(sol = native, token = token, "Wallet balance resolved");
    WalletBalance::new(&wallet.address, native, token)
}

// ============================================================================
// Tests unitaires
// ============================================================================
