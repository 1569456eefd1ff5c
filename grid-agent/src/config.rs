//! Agent configuration
//!
//! Identity of the node, where the hub lives and how often to heartbeat.

use std::collections::HashMap;
use std::time::Duration;

/// Default heartbeat period (5 seconds)
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(5_000);

/// Agent configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier this node registers under; must stay stable for the
    /// lifetime of the process
    pub node_id: String,

    /// Human-readable label (the hub substitutes a default when absent)
    pub node_name: Option<String>,

    /// Hub base URL (e.g., "http://localhost:8080")
    pub hub_url: String,

    /// How often to re-register
    pub heartbeat_interval: Duration,

    /// Operator-provided specs merged over the discovered ones
    pub labels: HashMap<String, String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(node_id: String, hub_url: String) -> Self {
        Self {
            node_id,
            node_name: None,
            hub_url,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            labels: HashMap::new(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HUB_URL (optional, default: http://localhost:8080)
    /// - NODE_ID (optional, default: generated)
    /// - NODE_NAME (optional, falls back to HOSTNAME)
    /// - HEARTBEAT_INTERVAL_MS (optional, milliseconds, default: 5000)
    /// - NODE_LABELS (optional, `key=value` pairs separated by commas)
    pub fn from_env() -> anyhow::Result<Self> {
        let hub_url =
            std::env::var("HUB_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let node_id = std::env::var("NODE_ID").unwrap_or_else(|_| generate_node_id());

        let node_name = std::env::var("NODE_NAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .ok();

        let heartbeat_interval = std::env::var("HEARTBEAT_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL);

        let labels = match std::env::var("NODE_LABELS") {
            Ok(raw) => parse_labels(&raw)?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            node_id,
            node_name,
            hub_url,
            heartbeat_interval,
            labels,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node_id.trim().is_empty() {
            anyhow::bail!("node_id cannot be empty");
        }

        if self.hub_url.is_empty() {
            anyhow::bail!("hub_url cannot be empty");
        }

        if !self.hub_url.starts_with("http://") && !self.hub_url.starts_with("https://") {
            anyhow::bail!("hub_url must start with http:// or https://");
        }

        if self.heartbeat_interval.is_zero() {
            anyhow::bail!("heartbeat_interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(generate_node_id(), "http://localhost:8080".to_string())
    }
}

fn generate_node_id() -> String {
    format!("node-{}", uuid::Uuid::new_v4())
}

/// Parses `key=value,key=value`
fn parse_labels(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(anyhow::anyhow!("Invalid label '{}', expected key=value", pair)),
        })
        .collect()
}
