//! Node Repository
//!
//! Handles all storage operations related to nodes.

use grid_core::domain::node::Node;

use super::Registry;

/// Insert a node, replacing any record with the same id wholesale
///
/// Returns the record that was replaced, if any.
pub fn upsert(registry: &Registry, node: Node) -> Option<Node> {
    registry.nodes_mut().insert(node.id.clone(), node)
}

/// Find a node by ID
pub fn find_by_id(registry: &Registry, id: &str) -> Option<Node> {
    registry.nodes().get(id).cloned()
}

/// Whether a node with this ID has ever registered
pub fn exists(registry: &Registry, id: &str) -> bool {
    registry.nodes().contains_key(id)
}

/// List all nodes as stored, ordered by ID
pub fn list_all(registry: &Registry) -> Vec<Node> {
    let mut nodes: Vec<Node> = registry.nodes().values().cloned().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use chrono::Utc;
    use grid_core::domain::node::NodeStatus;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            specs: HashMap::new(),
            status: NodeStatus::Idle,
            last_heartbeat: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let registry = Registry::new(Arc::new(SystemClock), Duration::from_secs(30));

        assert!(upsert(&registry, node("n1", "first")).is_none());
        let replaced = upsert(&registry, node("n1", "second")).unwrap();

        assert_eq!(replaced.name, "first");
        assert_eq!(find_by_id(&registry, "n1").unwrap().name, "second");
        assert_eq!(list_all(&registry).len(), 1);
    }

    #[test]
    fn test_list_all_sorted_by_id() {
        let registry = Registry::new(Arc::new(SystemClock), Duration::from_secs(30));
        upsert(&registry, node("b", "b"));
        upsert(&registry, node("a", "a"));
        upsert(&registry, node("c", "c"));

        let ids: Vec<String> = list_all(&registry).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(exists(&registry, "a"));
        assert!(!exists(&registry, "z"));
    }
}
