//! # betweenlines-server
//!
//! HTTP host for Between Lines letters.
//!
//! This binary provides:
//! - **Letter API** (axum) to create a letter from the compose form, read it
//!   back by id and mark it opened
//! - **Audio hosting** for clips attached to letters
//! - **Backend selection** at startup: durable (SQLite + files on disk) or
//!   local-only (in memory)

mod api;
mod backend;
mod config;
mod error;

use std::sync::Arc;

use betweenlines_shared::constants::APP_NAME;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,betweenlines_server=debug")),
        )
        .init();

    info!("Starting {} server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize the letter service on the configured backend
    // -----------------------------------------------------------------------
    let letters = backend::letter_service(&config).await?;

    let http_addr = config.http_addr;
    let app_state = AppState {
        letters,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
