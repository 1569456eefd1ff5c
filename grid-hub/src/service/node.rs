//! Node Service
//!
//! Registration, heartbeat and liveness-adjusted reads.

use chrono::{DateTime, Utc};
use grid_core::domain::node::{DEFAULT_NODE_NAME, Node, NodeStatus};
use grid_core::dto::node::RegisterNode;
use std::collections::HashSet;

use crate::repository::{Registry, job_repository, node_repository};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Node {0} not found")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;

const MAX_NODE_ID_LENGTH: usize = 255;

/// Register a node with the hub
///
/// This is also the heartbeat: an existing record with the same ID is
/// replaced wholesale and comes back `Idle` with a fresh timestamp.
pub fn register_node(registry: &Registry, req: RegisterNode) -> Result<Node> {
    let (id, specs) = validate_register_request(req.id, req.specs)?;

    let name = req
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_NODE_NAME.to_string());

    let node = Node {
        id,
        name,
        specs,
        status: NodeStatus::Idle,
        last_heartbeat: registry.now(),
    };

    match node_repository::upsert(registry, node.clone()) {
        Some(_) => tracing::debug!("Heartbeat from node: {}", node.id),
        None => tracing::info!("Node registered: {} ({})", node.id, node.name),
    }

    Ok(node)
}

/// List all known nodes with liveness applied
pub fn list_nodes(registry: &Registry) -> Vec<Node> {
    let now = registry.now();
    let busy = job_repository::busy_node_ids(registry);

    node_repository::list_all(registry)
        .into_iter()
        .map(|node| with_liveness(registry, node, now, &busy))
        .collect()
}

/// List only nodes that are currently live
pub fn list_online_nodes(registry: &Registry) -> Vec<Node> {
    list_nodes(registry)
        .into_iter()
        .filter(|node| node.status != NodeStatus::Offline)
        .collect()
}

/// Get a node by ID with liveness applied
pub fn get_node(registry: &Registry, id: &str) -> Result<Node> {
    let node = node_repository::find_by_id(registry, id)
        .ok_or_else(|| NodeError::NotFound(id.to_string()))?;

    let busy = job_repository::busy_node_ids(registry);
    Ok(with_liveness(registry, node, registry.now(), &busy))
}

/// Derive the reported status of a node
///
/// Silent nodes read `Offline`; live nodes holding a running job read
/// `Working`. Only the returned copy changes, so heartbeats keep storing
/// `Idle` and a node that heartbeats again reads correctly immediately.
fn with_liveness(
    registry: &Registry,
    mut node: Node,
    now: DateTime<Utc>,
    busy: &HashSet<String>,
) -> Node {
    if now.signed_duration_since(node.last_heartbeat) > registry.liveness_timeout() {
        node.status = NodeStatus::Offline;
    } else if busy.contains(&node.id) {
        node.status = NodeStatus::Working;
    }
    node
}

// =============================================================================
// Validation
// =============================================================================

fn validate_register_request<S>(id: Option<String>, specs: Option<S>) -> Result<(String, S)> {
    let id = id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| NodeError::ValidationError("Missing id".to_string()))?;

    if id.len() > MAX_NODE_ID_LENGTH {
        return Err(NodeError::ValidationError(format!(
            "Node ID is too long (max {} characters)",
            MAX_NODE_ID_LENGTH
        )));
    }

    let specs = specs.ok_or_else(|| NodeError::ValidationError("Missing specs".to_string()))?;

    Ok((id, specs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::service::job_service;
    use grid_core::domain::job::JobStatus;
    use grid_core::dto::job::SubmitJob;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (Arc<ManualClock>, Registry) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = Registry::new(clock.clone(), Duration::from_secs(30));
        (clock, registry)
    }

    fn request(id: &str, specs: &[(&str, &str)]) -> RegisterNode {
        RegisterNode {
            id: Some(id.to_string()),
            name: Some(format!("{}-host", id)),
            specs: Some(
                specs
                    .iter()
                    .map(|(k, v)| (k.to_string(), json!(v)))
                    .collect::<HashMap<_, _>>(),
            ),
        }
    }

    fn status_of(registry: &Registry, id: &str) -> NodeStatus {
        list_nodes(registry)
            .into_iter()
            .find(|n| n.id == id)
            .map(|n| n.status)
            .unwrap()
    }

    #[test]
    fn test_register_requires_id_and_specs() {
        let (_, registry) = setup();

        let mut req = request("n1", &[("cpu", "4 vCPU")]);
        req.id = None;
        assert!(matches!(
            register_node(&registry, req),
            Err(NodeError::ValidationError(_))
        ));

        let mut req = request("n1", &[("cpu", "4 vCPU")]);
        req.specs = None;
        assert!(matches!(
            register_node(&registry, req),
            Err(NodeError::ValidationError(_))
        ));

        let mut req = request("n1", &[]);
        req.id = Some("   ".to_string());
        assert!(register_node(&registry, req).is_err());

        assert!(list_nodes(&registry).is_empty());
    }

    #[test]
    fn test_register_rejects_long_id() {
        let (_, registry) = setup();
        let req = request(&"x".repeat(256), &[]);
        assert!(matches!(
            register_node(&registry, req),
            Err(NodeError::ValidationError(_))
        ));
    }

    #[test]
    fn test_register_defaults_name() {
        let (_, registry) = setup();
        let mut req = request("n1", &[]);
        req.name = None;

        let node = register_node(&registry, req).unwrap();
        assert_eq!(node.name, DEFAULT_NODE_NAME);
        assert_eq!(node.status, NodeStatus::Idle);
    }

    #[test]
    fn test_reregistration_replaces_wholesale() {
        let (clock, registry) = setup();
        register_node(&registry, request("n1", &[("cpu", "4 vCPU"), ("ram", "8GB")])).unwrap();

        clock.advance(Duration::from_secs(3));
        let mut req = request("n1", &[("gpu", "A100")]);
        req.name = None;
        register_node(&registry, req).unwrap();

        let nodes = list_nodes(&registry);
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.name, DEFAULT_NODE_NAME);
        assert_eq!(node.specs.len(), 1);
        assert_eq!(node.specs["gpu"], json!("A100"));
        assert!(!node.specs.contains_key("cpu"));
        assert_eq!(node.last_heartbeat, registry.now());
    }

    #[test]
    fn test_offline_only_after_window_elapses() {
        let (clock, registry) = setup();
        register_node(&registry, request("n1", &[])).unwrap();

        clock.advance(Duration::from_secs(30));
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Idle);

        clock.advance(Duration::from_millis(1));
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Offline);
    }

    #[test]
    fn test_offline_node_recovers_on_heartbeat() {
        let (clock, registry) = setup();
        register_node(&registry, request("n1", &[("cpu", "4 vCPU"), ("ram", "8GB")])).unwrap();

        clock.advance(Duration::from_secs(31));
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Offline);

        clock.advance(Duration::from_millis(500));
        register_node(&registry, request("n1", &[("cpu", "4 vCPU"), ("ram", "8GB")])).unwrap();

        clock.advance(Duration::from_millis(500));
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Idle);
    }

    #[test]
    fn test_offline_is_not_stored() {
        let (clock, registry) = setup();
        register_node(&registry, request("n1", &[])).unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(get_node(&registry, "n1").unwrap().status, NodeStatus::Offline);

        let stored = node_repository::find_by_id(&registry, "n1").unwrap();
        assert_eq!(stored.status, NodeStatus::Idle);
    }

    #[test]
    fn test_offline_nodes_remain_listed() {
        let (clock, registry) = setup();
        register_node(&registry, request("old", &[])).unwrap();
        clock.advance(Duration::from_secs(45));
        register_node(&registry, request("new", &[])).unwrap();

        assert_eq!(list_nodes(&registry).len(), 2);

        let online = list_online_nodes(&registry);
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].id, "new");
    }

    #[test]
    fn test_claimed_node_reads_working_until_job_ends() {
        let (clock, registry) = setup();
        register_node(&registry, request("n1", &[("cpu", "4 vCPU")])).unwrap();
        let job = job_service::submit_job(
            &registry,
            SubmitJob {
                buyer_id: None,
                script: Some("print(1)".to_string()),
            },
        )
        .unwrap();

        job_service::claim_job(&registry, job.id, "n1").unwrap();
        assert_eq!(get_node(&registry, "n1").unwrap().status, NodeStatus::Working);

        // Heartbeats don't clear it, and silence still wins
        register_node(&registry, request("n1", &[("cpu", "4 vCPU")])).unwrap();
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Working);
        clock.advance(Duration::from_secs(31));
        assert_eq!(status_of(&registry, "n1"), NodeStatus::Offline);

        register_node(&registry, request("n1", &[("cpu", "4 vCPU")])).unwrap();
        job_service::set_status(&registry, job.id, JobStatus::Completed, None, Some("n1"))
            .unwrap();
        assert_eq!(get_node(&registry, "n1").unwrap().status, NodeStatus::Idle);
        assert_eq!(
            node_repository::find_by_id(&registry, "n1").unwrap().status,
            NodeStatus::Idle
        );
    }

    #[test]
    fn test_concurrent_heartbeats_keep_one_record() {
        let (_, registry) = setup();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for round in 0..50 {
                        let value = format!("{}-{}", i, round);
                        let specs = [("cpu", value.as_str()), ("ram", value.as_str())];
                        let mut req = request("n1", &specs);
                        req.name = Some(value.clone());
                        register_node(&registry, req).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let nodes = list_nodes(&registry);
        assert_eq!(nodes.len(), 1);

        // Whichever heartbeat landed last, its body is intact
        let node = &nodes[0];
        assert_eq!(node.specs.len(), 2);
        assert_eq!(node.specs["cpu"], json!(node.name));
        assert_eq!(node.specs["ram"], json!(node.name));
        assert_eq!(node.status, NodeStatus::Idle);
    }

    #[test]
    fn test_get_unknown_node() {
        let (_, registry) = setup();
        assert!(matches!(
            get_node(&registry, "ghost"),
            Err(NodeError::NotFound(_))
        ));
    }
}
