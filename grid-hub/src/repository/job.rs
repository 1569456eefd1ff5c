//! Job Repository
//!
//! Handles all storage operations related to jobs.

use grid_core::domain::job::{Job, JobStatus};
use std::collections::HashSet;
use uuid::Uuid;

use super::Registry;

/// Store a newly created job
pub fn insert(registry: &Registry, job: Job) {
    registry.jobs_mut().insert(job.id, job);
}

/// Find a job by ID
pub fn find_by_id(registry: &Registry, id: Uuid) -> Option<Job> {
    registry.jobs().get(&id).cloned()
}

/// List all jobs, oldest first
pub fn list_all(registry: &Registry) -> Vec<Job> {
    sorted(registry.jobs().values().cloned().collect())
}

/// List jobs submitted by one buyer, oldest first
pub fn find_by_buyer(registry: &Registry, buyer_id: &str) -> Vec<Job> {
    sorted(
        registry
            .jobs()
            .values()
            .filter(|job| job.buyer_id == buyer_id)
            .cloned()
            .collect(),
    )
}

/// IDs of nodes currently holding a running job
pub fn busy_node_ids(registry: &Registry) -> HashSet<String> {
    registry
        .jobs()
        .values()
        .filter(|job| job.status == JobStatus::Running)
        .filter_map(|job| job.assigned_node_id.clone())
        .collect()
}

/// Run `f` against the stored job while holding the write lock
///
/// Returns `None` if no job has this ID. The check-then-mutate logic of a
/// status transition must live entirely inside `f`.
pub fn update<R>(registry: &Registry, id: Uuid, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
    registry.jobs_mut().get_mut(&id).map(f)
}

fn sorted(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    jobs
}
