//! # Storefront API Server
//!
//! ## Startup
//! ```text
//! .env ──► StorefrontConfig::load()
//!               │
//!               ├──► Database::new (pool + migrations)
//!               ├──► PayPalGateway::new (client timeout)
//!               │
//!               └──► axum::serve(0.0.0.0:PORT) ──► graceful shutdown on
//!                                                  Ctrl+C / SIGTERM
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use storefront_api::config::StorefrontConfig;
use storefront_api::services::payment::PayPalGateway;
use storefront_api::{app, AppState};
use storefront_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting Storefront API server...");

    let config = StorefrontConfig::load().context("loading configuration")?;
    info!(
        port = config.port,
        db = %config.database_path.display(),
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.db_max_connections),
    )
    .await
    .context("opening database")?;
    info!("Database ready");

    if !config.payment.is_configured() {
        warn!("PAYPAL_CLIENT_ID / PAYPAL_SECRET_KEY not set; payment verification will fail");
    }
    let payments = PayPalGateway::new(config.payment.clone()).context("building payment client")?;

    let state = AppState::new(db.clone(), Arc::new(payments));
    let router = app(state, config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
