//! Pledge Ledger - API Server Binary
//!
//! This binary starts the HTTP API server for recording pledge payments.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin pledge-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_SEED_DEMO_PLEDGE=true cargo run --bin pledge-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_DEFAULT_CURRENCY` - Currency for requests that omit one (default: GHS)
//! * `API_TIMEZONE` - Timezone for payment dates (default: Africa/Accra)
//! * `API_SEED_DEMO_PLEDGE` - Open a demo pledge at startup (default: false)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{Clock, SystemClock};
use domain_pledge::{InMemoryLedgerStore, LedgerStore, ReconciliationService};
use interface_api::{create_router, config::ApiConfig, seed_demo_pledge, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the ledger store and clock
/// into the reconciliation service, and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded or contains an unknown currency/timezone
/// - The demo pledge cannot be opened
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading API configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        currency = %config.default_currency,
        timezone = %config.timezone,
        "Starting Pledge Ledger API Server"
    );

    let clock = Arc::new(SystemClock::with_timezone(config.timezone()?));
    let store = Arc::new(InMemoryLedgerStore::new());
    let service = Arc::new(ReconciliationService::new(store.clone(), clock.clone()));

    if config.seed_demo_pledge {
        seed_demo_pledge(&service, config.currency()?, clock.today())
            .await
            .context("seeding demo pledge")?;
    }

    let ledgers = store.list_pledges().await?;
    tracing::info!(ledgers = ledgers.len(), "Ledger store ready");

    let state = AppState::new(service, config.clone())?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
