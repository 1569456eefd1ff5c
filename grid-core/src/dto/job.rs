//! Job DTOs for inter-service communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobStatus;

/// Request to submit a new job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitJob {
    #[serde(default)]
    pub buyer_id: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
}

/// Response to a job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
}

/// Query parameters for job listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub buyer_id: Option<String>,
}

/// Batch of log lines to append to a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendLogs {
    pub lines: Vec<String>,
}

/// Status change requested by whichever component drives execution
///
/// When `node_id` is set the hub only accepts the change from the node the
/// job was claimed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Request to hand a pending job to a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimJob {
    pub node_id: String,
}
