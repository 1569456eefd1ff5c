//! Log Service
//!
//! Business logic for job log appends.

use uuid::Uuid;

use crate::repository::{Registry, job_repository};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("{0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, LogError>;

const MAX_LINE_LENGTH: usize = 10_000;
const MAX_BATCH_SIZE: usize = 1000;

/// Append log lines to a job, in order
///
/// The whole batch lands under one lock, so concurrent appends to the
/// same job never interleave inside a batch. Unknown job IDs are an error
/// even for an empty batch. Terminal jobs still accept lines.
///
/// Returns the new log length.
pub fn append_logs(registry: &Registry, job_id: Uuid, lines: Vec<String>) -> Result<usize> {
    validate_log_lines(&lines)?;

    let count = lines.len();
    let len = job_repository::update(registry, job_id, |job| {
        job.logs.extend(lines);
        job.logs.len()
    })
    .ok_or(LogError::JobNotFound(job_id))?;

    tracing::debug!("Appended {} log line(s) to job: {}", count, job_id);

    Ok(len)
}

// =============================================================================
// Validation
// =============================================================================

fn validate_log_lines(lines: &[String]) -> Result<()> {
    if lines.len() > MAX_BATCH_SIZE {
        return Err(LogError::ValidationError(format!(
            "Too many log lines in batch (max: {})",
            MAX_BATCH_SIZE
        )));
    }

    for (i, line) in lines.iter().enumerate() {
        if line.len() > MAX_LINE_LENGTH {
            return Err(LogError::ValidationError(format!(
                "Log line {} too long (max: {} chars)",
                i, MAX_LINE_LENGTH
            )));
        }
    }

    Ok(())
}
