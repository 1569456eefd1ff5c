//! Hub configuration
//!
//! Bind address and liveness window, read from the environment.

use std::time::Duration;

/// Default liveness window (30 seconds)
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Hub configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on (e.g., "0.0.0.0:8080")
    pub bind_addr: String,

    /// Silence after which a node is reported offline
    pub liveness_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HUB_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - LIVENESS_TIMEOUT_MS (optional, milliseconds, default: 30000)
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("HUB_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let liveness_timeout = std::env::var("LIVENESS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LIVENESS_TIMEOUT);

        Self {
            bind_addr,
            liveness_timeout,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.liveness_timeout.is_zero() {
            anyhow::bail!("liveness_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}
