//! Grid Agent
//!
//! Runs on every worker machine and keeps its node record alive on the hub.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Services: Local machine description (specs)
//! - Heartbeat: Initial registration with backoff, then periodic re-registration
//!
//! The agent does not execute jobs; it only announces the machine.

mod config;
mod heartbeat;
mod service;

use anyhow::{Context, Result};
use grid_client::HubClient;
use grid_core::dto::node::RegisterNode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::heartbeat::HeartbeatAgent;
use crate::service::{SpecsService, StandardSpecsService};

/// Upper bound on a single registration call, well under the hub's liveness window
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Grid Agent");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    info!(
        "Loaded configuration: node_id={}, hub_url={}, heartbeat_interval={:?}",
        config.node_id, config.hub_url, config.heartbeat_interval
    );

    let specs = StandardSpecsService::new(config.labels.clone())
        .discover()
        .context("Failed to discover node specs")?;

    for (key, value) in &specs {
        info!("  - {}: {}", key, value);
    }

    let http_client = reqwest_client()?;
    let client = Arc::new(HubClient::with_client(config.hub_url.clone(), http_client));

    let registration = RegisterNode {
        id: Some(config.node_id.clone()),
        name: config.node_name.clone(),
        specs: Some(specs),
    };

    let agent = HeartbeatAgent::new(client, registration, config.heartbeat_interval);
    agent.run(shutdown_signal()).await;

    info!("Grid Agent stopped");

    Ok(())
}

fn reqwest_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
