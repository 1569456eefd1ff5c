//! Job-related API endpoints

use crate::HubClient;
use crate::error::Result;
use grid_core::domain::job::{Job, JobStatus};
use grid_core::dto::job::{AppendLogs, ClaimJob, SubmitJob, SubmitJobResponse, UpdateStatus};
use uuid::Uuid;

impl HubClient {
    // =============================================================================
    // Submission & Polling
    // =============================================================================

    /// Submit a job
    ///
    /// # Arguments
    /// * `buyer_id` - Submitting client; the hub records "anonymous" when absent
    /// * `script` - Job payload, must not be blank
    ///
    /// # Returns
    /// The ID of the new job
    pub async fn submit_job(&self, buyer_id: Option<&str>, script: &str) -> Result<Uuid> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SubmitJob {
                buyer_id: buyer_id.map(str::to_string),
                script: Some(script.to_string()),
            })
            .send()
            .await?;

        let submitted: SubmitJobResponse = self.handle_response(response).await?;
        Ok(submitted.job_id)
    }

    /// Get a job by ID, full log included
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/api/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List jobs, optionally only those of one buyer
    pub async fn list_jobs(&self, buyer_id: Option<&str>) -> Result<Vec<Job>> {
        let url = format!("{}/api/jobs", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(buyer_id) = buyer_id {
            request = request.query(&[("buyer_id", buyer_id)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Lifecycle (execution side)
    // =============================================================================

    /// Append log lines to a job
    pub async fn append_logs(&self, job_id: Uuid, lines: Vec<String>) -> Result<()> {
        let url = format!("{}/api/jobs/{}/logs", self.base_url, job_id);
        let response = self
            .client
            .post(&url)
            .json(&AppendLogs { lines })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Append a single log line to a job
    pub async fn append_log(&self, job_id: Uuid, line: impl Into<String>) -> Result<()> {
        self.append_logs(job_id, vec![line.into()]).await
    }

    /// Move a job forward in its lifecycle
    ///
    /// # Arguments
    /// * `job_id` - The job to update
    /// * `status` - The next status
    /// * `result` - Optional payload, only accepted with a terminal status
    /// * `node_id` - Reporting node; the hub rejects it unless it holds the job
    pub async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        result: Option<serde_json::Value>,
        node_id: Option<&str>,
    ) -> Result<Job> {
        let url = format!("{}/api/jobs/{}/status", self.base_url, job_id);
        let response = self
            .client
            .put(&url)
            .json(&UpdateStatus {
                status,
                result,
                node_id: node_id.map(str::to_string),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Claim a pending job for a node
    pub async fn claim_job(&self, job_id: Uuid, node_id: &str) -> Result<Job> {
        let url = format!("{}/api/jobs/{}/claim", self.base_url, job_id);
        let response = self
            .client
            .post(&url)
            .json(&ClaimJob {
                node_id: node_id.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
