//! Node-related API endpoints

use crate::HubClient;
use crate::error::{ClientError, Result};
use grid_core::domain::node::Node;
use grid_core::dto::node::RegisterNode;

impl HubClient {
    // =============================================================================
    // Registration & Heartbeat
    // =============================================================================

    /// Register a node with the hub
    ///
    /// Calling this again with the same ID is the heartbeat: the hub replaces
    /// the stored record and refreshes its liveness timestamp.
    ///
    /// # Example
    /// ```no_run
    /// # use grid_client::HubClient;
    /// # use grid_core::dto::node::RegisterNode;
    /// # use std::collections::HashMap;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = HubClient::new("http://localhost:8080");
    /// let node = client.register_node(&RegisterNode {
    ///     id: Some("node-001".to_string()),
    ///     name: Some("rack-3".to_string()),
    ///     specs: Some(HashMap::from([("cpu".to_string(), "4 vCPU".into())])),
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register_node(&self, req: &RegisterNode) -> Result<Node> {
        let url = format!("{}/api/nodes/register", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Node Query
    // =============================================================================

    /// List nodes known to the hub
    ///
    /// # Arguments
    /// * `online_only` - Skip nodes whose liveness window has elapsed
    pub async fn list_nodes(&self, online_only: bool) -> Result<Vec<Node>> {
        let url = format!("{}/api/nodes", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("online", online_only)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get details for a specific node
    pub async fn get_node(&self, node_id: &str) -> Result<Node> {
        let url = self.node_url(node_id)?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Node IDs are opaque, so they go in as one percent-encoded segment
    fn node_url(&self, node_id: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid hub URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("Invalid hub URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "nodes", node_id]);

        Ok(url)
    }
}
