//! Node API Handlers
//!
//! HTTP endpoints for node registration and liveness queries.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use grid_core::domain::node::Node;
use grid_core::dto::node::{ListNodesQuery, RegisterNode};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::node_service;

/// POST /api/nodes/register
/// Register a node, or refresh its heartbeat if already known
pub async fn register_node(
    State(registry): State<AppState>,
    payload: Result<Json<RegisterNode>, JsonRejection>,
) -> ApiResult<Json<Node>> {
    let Json(req) = payload?;
    let node = node_service::register_node(&registry, req)?;
    Ok(Json(node))
}

/// GET /api/nodes
/// List all known nodes, with silent ones reported offline
///
/// Query parameters:
/// - `online` (optional): Only return nodes that are currently live
pub async fn list_nodes(
    State(registry): State<AppState>,
    query: Result<Query<ListNodesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Node>>> {
    let Query(params) = query?;
    tracing::debug!("Listing nodes (online only: {})", params.online);

    let nodes = if params.online {
        node_service::list_online_nodes(&registry)
    } else {
        node_service::list_nodes(&registry)
    };

    Ok(Json(nodes))
}

/// GET /api/nodes/{id}
/// Get details for a specific node
pub async fn get_node(
    State(registry): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Node>> {
    tracing::debug!("Getting node: {}", id);

    let node = node_service::get_node(&registry, &id)?;
    Ok(Json(node))
}
