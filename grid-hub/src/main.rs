//! Grid Hub
//!
//! The rendezvous point of the mesh: agents register and heartbeat here,
//! clients submit jobs and poll them. All state lives in memory for the
//! lifetime of the process.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod clock;
pub mod config;
pub mod repository;
pub mod service;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::repository::Registry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_hub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Grid Hub...");

    let config = Config::from_env();
    config.validate()?;

    tracing::info!(
        "Liveness timeout: {:?}, bind address: {}",
        config.liveness_timeout,
        config.bind_addr
    );

    let registry = Arc::new(Registry::new(
        Arc::new(SystemClock),
        config.liveness_timeout,
    ));

    // Build router with all API endpoints
    let app = api::create_router(registry);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to start server")?;

    tracing::info!("Grid Hub stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
