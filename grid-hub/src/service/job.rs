//! Job Service
//!
//! Business logic for job submission and the job lifecycle.

use grid_core::domain::job::{Job, JobStatus};
use grid_core::dto::job::SubmitJob;
use uuid::Uuid;

use crate::repository::{Registry, job_repository, node_repository};

/// Buyer recorded when a submission doesn't name one
pub const DEFAULT_BUYER_ID: &str = "anonymous";

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Node {0} not found")]
    NodeNotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, JobError>;

/// Create a new pending job
pub fn submit_job(registry: &Registry, req: SubmitJob) -> Result<Job> {
    let script = req
        .script
        .filter(|script| !script.trim().is_empty())
        .ok_or_else(|| JobError::ValidationError("Missing script".to_string()))?;

    let buyer_id = req
        .buyer_id
        .filter(|buyer| !buyer.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BUYER_ID.to_string());

    let job = Job::new(buyer_id, script, registry.now());
    job_repository::insert(registry, job.clone());

    tracing::info!("Job created: {} for buyer: {}", job.id, job.buyer_id);

    Ok(job)
}

/// Get a job by ID
pub fn get_job(registry: &Registry, id: Uuid) -> Result<Job> {
    job_repository::find_by_id(registry, id).ok_or(JobError::NotFound(id))
}

/// List jobs, optionally only those of one buyer
pub fn list_jobs(registry: &Registry, buyer_id: Option<&str>) -> Vec<Job> {
    match buyer_id {
        Some(buyer_id) => job_repository::find_by_buyer(registry, buyer_id),
        None => job_repository::list_all(registry),
    }
}

/// Move a job to its next status
///
/// `result` may only accompany a terminal status. A `reporter` names the
/// node making the change; it must be the node the job was claimed by.
pub fn set_status(
    registry: &Registry,
    id: Uuid,
    status: JobStatus,
    result: Option<serde_json::Value>,
    reporter: Option<&str>,
) -> Result<Job> {
    if result.is_some() && !status.is_terminal() {
        return Err(JobError::ValidationError(format!(
            "A result can only be attached to a completed or failed job (requested: {})",
            status
        )));
    }

    let now = registry.now();

    let job = job_repository::update(registry, id, |job| -> Result<Job> {
        if let Some(node_id) = reporter {
            check_assignment(job, node_id)?;
        }
        transition(job, status)?;

        match status {
            JobStatus::Running => job.started_at = Some(now),
            JobStatus::Completed | JobStatus::Failed => {
                job.completed_at = Some(now);
                job.result = result;
            }
            JobStatus::Pending => {}
        }

        Ok(job.clone())
    })
    .ok_or(JobError::NotFound(id))??;

    tracing::info!("Job {} is now {}", id, status);

    Ok(job)
}

/// Hand a pending job to a registered node
///
/// Moves the job to `Running` and records the node in one step, so two
/// nodes racing for the same job cannot both win.
pub fn claim_job(registry: &Registry, id: Uuid, node_id: &str) -> Result<Job> {
    if !node_repository::exists(registry, node_id) {
        return Err(JobError::NodeNotFound(node_id.to_string()));
    }

    let now = registry.now();

    let job = job_repository::update(registry, id, |job| -> Result<Job> {
        transition(job, JobStatus::Running)?;
        job.assigned_node_id = Some(node_id.to_string());
        job.started_at = Some(now);
        Ok(job.clone())
    })
    .ok_or(JobError::NotFound(id))??;

    tracing::info!("Job {} claimed by node {}", id, node_id);

    Ok(job)
}

// =============================================================================
// State machine
// =============================================================================

fn check_assignment(job: &Job, node_id: &str) -> Result<()> {
    if job.assigned_node_id.as_deref() != Some(node_id) {
        tracing::warn!("Node {} reported on job {} it does not hold", node_id, job.id);
        return Err(JobError::InvalidState(format!(
            "Job {} is not assigned to node {}",
            job.id, node_id
        )));
    }
    Ok(())
}

fn transition(job: &mut Job, next: JobStatus) -> Result<()> {
    if !job.status.can_transition_to(next) {
        tracing::warn!(
            "Rejected transition for job {}: {} -> {}",
            job.id,
            job.status,
            next
        );
        return Err(JobError::InvalidState(format!(
            "Job {} cannot move from {} to {}",
            job.id, job.status, next
        )));
    }

    job.status = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::service::node_service;
    use chrono::Utc;
    use grid_core::dto::node::RegisterNode;
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (Arc<ManualClock>, Registry) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = Registry::new(clock.clone(), Duration::from_secs(30));
        (clock, registry)
    }

    fn submit(registry: &Registry, buyer: &str, script: &str) -> Job {
        submit_job(
            registry,
            SubmitJob {
                buyer_id: Some(buyer.to_string()),
                script: Some(script.to_string()),
            },
        )
        .unwrap()
    }

    fn register(registry: &Registry, id: &str) {
        node_service::register_node(
            registry,
            RegisterNode {
                id: Some(id.to_string()),
                name: None,
                specs: Some(HashMap::new()),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_submit_then_get() {
        let (_, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");

        let fetched = get_job(&registry, job.id).unwrap();
        assert_eq!(fetched.status, JobStatus::Pending);
        assert_eq!(
            fetched.logs,
            vec!["Job received by Hub", "Waiting for assignment..."]
        );
        assert!(fetched.assigned_node_id.is_none());
        assert_eq!(fetched.buyer_id, "buyer1");
        assert_eq!(fetched.created_at, registry.now());
    }

    #[test]
    fn test_submit_requires_script() {
        let (_, registry) = setup();

        let missing = submit_job(
            &registry,
            SubmitJob {
                buyer_id: Some("buyer1".to_string()),
                script: None,
            },
        );
        assert!(matches!(missing, Err(JobError::ValidationError(_))));

        let blank = submit_job(
            &registry,
            SubmitJob {
                buyer_id: None,
                script: Some("  \n".to_string()),
            },
        );
        assert!(matches!(blank, Err(JobError::ValidationError(_))));
        assert!(list_jobs(&registry, None).is_empty());
    }

    #[test]
    fn test_submit_defaults_buyer() {
        let (_, registry) = setup();
        let job = submit_job(
            &registry,
            SubmitJob {
                buyer_id: None,
                script: Some("print(1)".to_string()),
            },
        )
        .unwrap();
        assert_eq!(job.buyer_id, DEFAULT_BUYER_ID);
    }

    #[test]
    fn test_job_ids_unique() {
        let (_, registry) = setup();
        let ids: HashSet<Uuid> = (0..10_000)
            .map(|_| submit(&registry, "buyer1", "print(1)").id)
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_get_unknown_job() {
        let (_, registry) = setup();
        assert!(matches!(
            get_job(&registry, Uuid::new_v4()),
            Err(JobError::NotFound(_))
        ));
    }

    #[test]
    fn test_full_lifecycle() {
        let (clock, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");

        clock.advance(Duration::from_secs(1));
        let running = set_status(&registry, job.id, JobStatus::Running, None, None).unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert_eq!(running.started_at, Some(registry.now()));

        clock.advance(Duration::from_secs(1));
        let done = set_status(
            &registry,
            job.id,
            JobStatus::Completed,
            Some(json!({"stdout": "1"})),
            None,
        )
        .unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.result, Some(json!({"stdout": "1"})));
        assert_eq!(done.completed_at, Some(registry.now()));
    }

    #[test]
    fn test_terminal_job_cannot_reopen() {
        let (_, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");
        set_status(&registry, job.id, JobStatus::Running, None, None).unwrap();
        set_status(&registry, job.id, JobStatus::Completed, None, None).unwrap();

        let reopened = set_status(&registry, job.id, JobStatus::Running, None, None);
        assert!(matches!(reopened, Err(JobError::InvalidState(_))));

        let flipped = set_status(&registry, job.id, JobStatus::Failed, None, None);
        assert!(matches!(flipped, Err(JobError::InvalidState(_))));

        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn test_pending_cannot_skip_running() {
        let (_, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");

        let skipped = set_status(&registry, job.id, JobStatus::Failed, None, None);
        assert!(matches!(skipped, Err(JobError::InvalidState(_))));
        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn test_result_requires_terminal_status() {
        let (_, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");

        let early = set_status(&registry, job.id, JobStatus::Running, Some(json!("x")), None);
        assert!(matches!(early, Err(JobError::ValidationError(_))));
        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn test_set_status_unknown_job() {
        let (_, registry) = setup();
        let result = set_status(&registry, Uuid::new_v4(), JobStatus::Running, None, None);
        assert!(matches!(result, Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_claim_assigns_node() {
        let (_, registry) = setup();
        register(&registry, "n1");
        let job = submit(&registry, "buyer1", "print(1)");

        let claimed = claim_job(&registry, job.id, "n1").unwrap();
        assert_eq!(claimed.status, JobStatus::Running);
        assert_eq!(claimed.assigned_node_id.as_deref(), Some("n1"));

        register(&registry, "n2");
        let second = claim_job(&registry, job.id, "n2");
        assert!(matches!(second, Err(JobError::InvalidState(_))));
        assert_eq!(
            get_job(&registry, job.id).unwrap().assigned_node_id.as_deref(),
            Some("n1")
        );
    }

    #[test]
    fn test_only_assigned_node_may_report() {
        let (_, registry) = setup();
        register(&registry, "n1");
        register(&registry, "n2");
        let job = submit(&registry, "buyer1", "print(1)");
        claim_job(&registry, job.id, "n1").unwrap();

        let stolen = set_status(&registry, job.id, JobStatus::Completed, None, Some("n2"));
        assert!(matches!(stolen, Err(JobError::InvalidState(_))));
        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Running);

        let done = set_status(
            &registry,
            job.id,
            JobStatus::Completed,
            Some(json!({"exit": 0})),
            Some("n1"),
        )
        .unwrap();
        assert_eq!(done.status, JobStatus::Completed);
    }

    #[test]
    fn test_unclaimed_job_rejects_node_report() {
        let (_, registry) = setup();
        register(&registry, "n1");
        let job = submit(&registry, "buyer1", "print(1)");

        let result = set_status(&registry, job.id, JobStatus::Running, None, Some("n1"));
        assert!(matches!(result, Err(JobError::InvalidState(_))));
        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn test_claim_requires_registered_node() {
        let (_, registry) = setup();
        let job = submit(&registry, "buyer1", "print(1)");

        let result = claim_job(&registry, job.id, "ghost");
        assert!(matches!(result, Err(JobError::NodeNotFound(_))));
        assert_eq!(get_job(&registry, job.id).unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn test_list_jobs_by_buyer() {
        let (clock, registry) = setup();
        let first = submit(&registry, "alice", "a");
        clock.advance(Duration::from_secs(1));
        submit(&registry, "bob", "b");
        clock.advance(Duration::from_secs(1));
        let third = submit(&registry, "alice", "c");

        let alice: Vec<Uuid> = list_jobs(&registry, Some("alice"))
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(alice, vec![first.id, third.id]);
        assert_eq!(list_jobs(&registry, None).len(), 3);
        assert!(list_jobs(&registry, Some("carol")).is_empty());
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let (_, registry) = setup();
        let registry = Arc::new(registry);
        let job = submit(&registry, "buyer1", "print(1)");
        for i in 0..8 {
            register(&registry, &format!("n{}", i));
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || claim_job(&registry, job.id, &format!("n{}", i)).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
