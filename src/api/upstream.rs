// ============================================================================
// Client amont : une requête HTTP(S) + parsing JSON avec délai
// ============================================================================
// Toutes les sources (CoinGecko, DexScreener, RPC Solana) passent par ici
//
// CONCEPTS RUST :
// 1. Génériques : get_json::<T>() désérialise vers n'importe quel type
//    (serde_json::Value pour un document générique)
// 2. tokio::time::timeout : si le délai expire, la future est droppée,
//    ce qui ferme la connexion en cours
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::UpstreamError;

const USER_AGENT: &str = concat!("lazymarket/", env!("CARGO_PKG_VERSION"));

/// Client HTTP partagé par toutes les sources
///
/// CONCEPT RUST : Clone bon marché
/// - reqwest::Client contient un Arc interne
/// - Cloner le client partage le pool de connexions
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Crée le client avec un User-Agent fixe
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Échec de la création du client HTTP")?;
        Ok(Self { http })
    }

    /// GET + parsing JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        self.execute(self.http.get(url), url, timeout).await
    }

    /// POST d'un corps JSON (appels JSON-RPC) + parsing JSON
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        self.execute(self.http.post(url).json(body), url, timeout).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Sending upstream request");

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::invalid(url, format!("HTTP {}", status)));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, e))?;

            serde_json::from_slice::<T>(&body)
                .map_err(|e| UpstreamError::invalid(url, e.to_string()))
        };

        let result = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        if let Err(e) = &result {
            warn!(url = %url, kind = e.kind(), error = %e, "Upstream request failed");
        }
        result
    }
}

/// Échec d'envoi ou de lecture du corps
///
/// Le délai est appliqué par tokio::time::timeout autour de l'échange :
/// le client reqwest n'a pas de timeout propre.
fn transport_error(url: &str, e: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Joint une URL de base et un chemin sans doubler le '/'
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::Router;
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a/b/", "/c"), "http://a/b/c");
        assert_eq!(join_url("http://a", "c?x=1"), "http://a/c?x=1");
    }

    #[tokio::test]
    async fn test_get_json_parses_document() {
        let base = serve(Router::new().route("/ok", get(|| async { axum::Json(json!({"a": 1})) }))).await;
        let client = UpstreamClient::new().unwrap();

        let doc: Value = client
            .get_json(&format!("{}/ok", base), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(doc["a"], 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let base = serve(Router::new().route("/bad", get(|| async { "not json" }))).await;
        let client = UpstreamClient::new().unwrap();

        let err = client
            .get_json::<Value>(&format!("{}/bad", base), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[tokio::test]
    async fn test_error_status_is_invalid_response() {
        let base = serve(Router::new()).await;
        let client = UpstreamClient::new().unwrap();

        let err = client
            .get_json::<Value>(&format!("{}/missing", base), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(json!({}))
            }),
        );
        let base = serve(app).await;
        let client = UpstreamClient::new().unwrap();

        let started = std::time::Instant::now();
        let err = client
            .get_json::<Value>(&format!("{}/slow", base), Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Timeout { timeout_ms: 100, .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        // Port 1 : rien n'écoute dessus
        let client = UpstreamClient::new().unwrap();
        let err = client
            .get_json::<Value>("http://127.0.0.1:1/", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
