//! API Module
//!
//! HTTP API layer for the hub.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;
pub mod node;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::repository::Registry;

/// State shared by every handler
pub type AppState = Arc<Registry>;

/// Create the main API router with all endpoints
pub fn create_router(registry: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Node endpoints
        .route("/api/nodes/register", post(node::register_node))
        .route("/api/nodes", get(node::list_nodes))
        .route("/api/nodes/{id}", get(node::get_node))
        // Job endpoints
        .route("/api/jobs", post(job::submit_job).get(job::list_jobs))
        .route("/api/jobs/{id}", get(job::get_job))
        .route("/api/jobs/{id}/logs", post(job::append_logs))
        .route("/api/jobs/{id}/status", put(job::update_status))
        .route("/api/jobs/{id}/claim", post(job::claim_job))
        // Add state and middleware
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
