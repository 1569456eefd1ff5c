//! Grid HTTP Client
//!
//! A simple, type-safe HTTP client for communicating with the Grid hub API.
//!
//! This crate provides a unified interface for the heartbeat agent and the
//! CLI, plus the client side of the job polling contract.
//!
//! # Example
//!
//! ```no_run
//! use grid_client::{HubClient, JobPoller};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HubClient::new("http://localhost:8080");
//!
//!     let job_id = client.submit_job(Some("buyer1"), "print(1)").await?;
//!     let job = JobPoller::default().wait(&client, job_id).await?;
//!
//!     println!("Job {} finished as {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod nodes;
pub mod poller;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{JobPoller, JobSource};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Grid hub API
///
/// This client provides methods for all hub API endpoints, organized
/// into logical groups:
/// - Node registration and liveness queries
/// - Job submission and polling
/// - Job lifecycle updates (logs, status, claims)
#[derive(Debug, Clone)]
pub struct HubClient {
    /// Base URL of the hub (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HubClient {
    /// Create a new hub client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the hub API (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use grid_client::HubClient;
    ///
    /// let client = HubClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new hub client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use grid_client::HubClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = HubClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the hub
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::from_status(status.as_u16(), &error_text))
    }
}
