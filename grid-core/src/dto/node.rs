//! Node DTOs
//!
//! Data transfer objects for node registration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to register a node (also used as the heartbeat)
///
/// `id` and `specs` are optional on the wire so the hub can answer a
/// missing field with its own validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterNode {
    /// Identifier chosen by the agent
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable label
    #[serde(default)]
    pub name: Option<String>,

    /// Hardware description
    #[serde(default)]
    pub specs: Option<HashMap<String, serde_json::Value>>,
}

/// Query parameters for node listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNodesQuery {
    /// Only return nodes that are currently live
    #[serde(default)]
    pub online: bool,
}
