// ============================================================================
// LazyMarket - Serveur de l'API JSON
// ============================================================================
// Prix crypto, solde du portefeuille et indicateurs techniques en direct.
// Chaque requête déclenche de nouveaux appels amont, rien n'est mis en cache.
// ============================================================================

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use lazymarket::config::AppConfig;
use lazymarket::routes;
use lazymarket::state::AppState;

// ============================================================================
// Initialisation du logging
// ============================================================================
// - stdout pour suivre le serveur en direct
// - fichier avec rotation quotidienne pour l'historique
// ============================================================================

/// Répertoire des logs : LOG_DIR, sinon ~/.local/share/lazymarket/logs
fn log_dir(config: &AppConfig) -> PathBuf {
    config.log_dir.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .map(|dir| dir.join("lazymarket").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    })
}

/// Initialise le système de logging
///
/// # Utilisation
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazymarket=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazymarket.log");

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazymarket=debug,tower_http=info,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Si l'init échoue, on continue sans logs
    init_logging(&log_dir(&config)).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    if config.wallet.address.is_empty() {
        warn!("WALLET_ADDRESS is not set, /api/wallet will report an error");
    }

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .with_context(|| format!("Adresse d'écoute invalide : {}:{}", config.bind, config.port))?;

    let state = AppState::new(config)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Impossible d'écouter sur {}", addr))?;
    info!(%addr, "LazyMarket is online");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erreur du serveur HTTP");

    match &result {
        Ok(_) => info!("Server exited normally"),
        Err(e) => error!(error = ?e, "Server exited with error"),
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping");
}
