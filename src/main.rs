//! Allocation engine API server binary.
//!
//! # Usage
//!
//! ```bash
//! # Run with the bundled configuration
//! cargo run --release
//!
//! # Point at another property's configuration
//! ALLOCATION_CONFIG_DIR=./config/house-02 ALLOCATION_PORT=9000 cargo run --release
//! ```
//!
//! # Environment Variables
//!
//! * `ALLOCATION_CONFIG_DIR` - Configuration directory (default: ./config/default)
//! * `ALLOCATION_HOST` - Overrides `server.host` from engine.yaml
//! * `ALLOCATION_PORT` - Overrides `server.port` from engine.yaml
//! * `RUST_LOG` - Log filter; falls back to `server.log_level`

use std::net::SocketAddr;

use allocation_engine::api::{AppState, create_router};
use allocation_engine::config::ConfigLoader;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_dir =
        std::env::var("ALLOCATION_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;

    init_tracing(&config.server().log_level);

    let host = std::env::var("ALLOCATION_HOST").unwrap_or_else(|_| config.server().host.clone());
    let port = std::env::var("ALLOCATION_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.server().port);

    tracing::info!(
        config_dir = %config_dir,
        property = %config.metadata().name,
        rooms = config.registry().len(),
        policy = config.settlement().missing_reading_policy.as_str(),
        "Configuration loaded"
    );

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let app = create_router(AppState::new(config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber, preferring `RUST_LOG` when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to install SIGTERM handler");
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
