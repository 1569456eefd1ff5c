//! Node domain model
//!
//! Represents a worker machine that announces itself to the hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name given to nodes that register without one
pub const DEFAULT_NODE_NAME: &str = "Unknown Node";

/// A worker machine known to the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier chosen by the agent
    pub id: String,

    /// Human-readable label
    pub name: String,

    /// Free-form hardware description (cpu, ram, ...)
    pub specs: HashMap<String, serde_json::Value>,

    /// Stored status, or `Offline` when the liveness window has elapsed
    pub status: NodeStatus,

    /// Last time this node registered or sent a heartbeat
    pub last_heartbeat: DateTime<Utc>,
}

/// Status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Node is alive and not executing anything
    Idle,

    /// Node is alive and executing a job
    Working,

    /// Node hasn't sent a heartbeat within the liveness window.
    /// Only ever produced at read time, never stored.
    Offline,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Idle => write!(f, "idle"),
            NodeStatus::Working => write!(f, "working"),
            NodeStatus::Offline => write!(f, "offline"),
        }
    }
}
