//! EdgeOne Access Rule Gateway
//!
//! Serves the access-rule routes and forwards each call to the EdgeOne API.
//!
//! # Usage
//! ```bash
//! export TEO_SECRET_ID=... TEO_SECRET_KEY=... TEO_REGION=ap-guangzhou
//! teo-gateway --bind 0.0.0.0:3000
//!
//! # or keep them in ./.env
//! teo-gateway
//!
//! curl localhost:3000/access_rules/get_rules/zone-2o0i41pv2h8c
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teo_gateway::config::load_env_file;
use teo_gateway::{router, AppState, EnvClientFactory};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser, Debug)]
#[command(name = "teo-gateway")]
#[command(about = "HTTP gateway for EdgeOne L7 access rules", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Human-readable logs instead of JSON
    #[arg(long, env = "PRETTY_LOGS")]
    pretty_logs: bool,
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so BIND_ADDRESS and PRETTY_LOGS can come from .env too
    let env_file = load_env_file(None);
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.pretty_logs {
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .json()
            .init();
    }

    info!("Starting EdgeOne access rule gateway v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &env_file {
        info!("Loaded environment from {}", path.display());
    }

    // Credentials are resolved per request, not here
    let state = AppState::new(Arc::new(EnvClientFactory::new()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    info!("Gateway listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, shutting down gracefully...");
}
