// ============================================================================
// Structure : WalletBalance
// ============================================================================
// Solde SOL + solde du token suivi (USDT) pour l'adresse configurée
// ============================================================================

use serde::Serialize;

/// Lamports par SOL (unité indivisible -> unité affichée)
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Soldes du portefeuille
///
/// Soit les deux champs sont renseignés, soit les deux valent 0 et `error`
/// décrit l'échec. Jamais de résultat partiel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletBalance {
    /// Solde natif en SOL
    #[serde(rename = "sol")]
    pub native_balance: f64,

    /// Solde du token (montant lisible, déjà divisé par les décimales)
    #[serde(rename = "usdt")]
    pub token_balance: f64,

    pub address: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WalletBalance {
    pub fn new(address: impl Into<String>, native_balance: f64, token_balance: f64) -> Self {
        Self {
            native_balance,
            token_balance,
            address: address.into(),
            error: None,
        }
    }

    /// Résultat complet mais à zéro, avec la cause de l'échec
    pub fn failed(address: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            native_balance: 0.0,
            token_balance: 0.0,
            address: address.into(),
            error: Some(error.into()),
        }
    }

    /// Convertit un montant en lamports vers des SOL
    pub fn lamports_to_sol(lamports: u64) -> f64 {
        lamports as f64 / LAMPORTS_PER_SOL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(WalletBalance::lamports_to_sol(1_500_000_000), 1.5);
        assert_eq!(WalletBalance::lamports_to_sol(0), 0.0);
    }

    #[test]
    fn test_failed_balance_is_zeroed() {
        let balance = WalletBalance::failed("addr", "rpc down");
        let json = serde_json::to_value(&balance).unwrap();

        assert_eq!(json["sol"], 0.0);
        assert_eq!(json["usdt"], 0.0);
        assert_eq!(json["error"], "rpc down");
    }

    #[test]
    fn test_ok_balance_has_no_error_field() {
        let json = serde_json::to_value(WalletBalance::new("addr", 2.0, 10.5)).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["usdt"], 10.5);
    }
}
