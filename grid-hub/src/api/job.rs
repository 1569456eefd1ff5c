//! Job API Handlers
//!
//! HTTP endpoints for job submission, polling and lifecycle updates.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use grid_core::domain::job::Job;
use grid_core::dto::job::{
    AppendLogs, ClaimJob, ListJobsQuery, SubmitJob, SubmitJobResponse, UpdateStatus,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::{job_service, log_service};

// =============================================================================
// Submission & Polling
// =============================================================================

/// POST /api/jobs
/// Submit a new job
pub async fn submit_job(
    State(registry): State<AppState>,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let Json(req) = payload?;
    let job = job_service::submit_job(&registry, req)?;
    Ok((StatusCode::CREATED, Json(SubmitJobResponse { job_id: job.id })))
}

/// GET /api/jobs
/// List jobs, optionally for a single buyer
pub async fn list_jobs(
    State(registry): State<AppState>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Job>>> {
    let Query(params) = query?;
    tracing::debug!("Listing jobs (buyer: {:?})", params.buyer_id);

    Ok(Json(job_service::list_jobs(
        &registry,
        params.buyer_id.as_deref(),
    )))
}

/// GET /api/jobs/{id}
/// Get a job snapshot, logs included
pub async fn get_job(
    State(registry): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(&registry, parse_job_id(&id)?)?;
    Ok(Json(job))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// POST /api/jobs/{id}/logs
/// Append log lines to a job
pub async fn append_logs(
    State(registry): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AppendLogs>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = payload?;
    log_service::append_logs(&registry, parse_job_id(&id)?, req.lines)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/jobs/{id}/status
/// Move a job forward in its lifecycle
pub async fn update_status(
    State(registry): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatus>, JsonRejection>,
) -> ApiResult<Json<Job>> {
    let Json(req) = payload?;
    let job = job_service::set_status(
        &registry,
        parse_job_id(&id)?,
        req.status,
        req.result,
        req.node_id.as_deref(),
    )?;
    Ok(Json(job))
}

/// POST /api/jobs/{id}/claim
/// Hand a pending job to a node
pub async fn claim_job(
    State(registry): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClaimJob>, JsonRejection>,
) -> ApiResult<Json<Job>> {
    let Json(req) = payload?;
    let job = job_service::claim_job(&registry, parse_job_id(&id)?, &req.node_id)?;
    Ok(Json(job))
}

/// Job IDs are UUIDs; anything else can never name a job.
fn parse_job_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(format!("Job {} not found", id)))
}
