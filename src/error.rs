// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées des fournisseurs amont et leur conversion en réponse HTTP
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error + Display
// - #[error("...")] définit le message affiché
// ============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Échec d'un appel vers un fournisseur amont (prix, chandelles, RPC)
///
/// Les appelants traitent toutes les variantes de la même façon
/// ("fournisseur indisponible"), mais les logs les distinguent via `kind()`.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Le fournisseur n'a pas répondu avant l'échéance
    #[error("délai dépassé ({timeout_ms} ms) pour {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// DNS, connexion refusée, connexion réinitialisée...
    #[error("erreur de transport vers {url} : {message}")]
    Transport { url: String, message: String },

    /// Statut HTTP non-2xx ou corps qui ne correspond pas au format attendu
    #[error("réponse invalide de {url} : {message}")]
    InvalidResponse { url: String, message: String },

    /// Réponse valide mais sans paire / compte correspondant
    #[error("aucune donnée correspondante : {0}")]
    NotFound(String),
}

impl UpstreamError {
    /// Tag court pour les logs structurés
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::NotFound(_) => "not_found",
        }
    }

    pub(crate) fn invalid(url: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Erreur renvoyée au client HTTP sous la forme `{"error": "..."}`
///
/// Seul l'historique propage une erreur : il n'existe pas de série de
/// chandelles par défaut.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
