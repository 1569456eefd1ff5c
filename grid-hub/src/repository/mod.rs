//! Repository Module
//!
//! In-memory data access layer for the hub.
//! `Registry` owns every node and job record; each repository submodule
//! exposes the operations for one entity. All state is process-lifetime
//! only and nothing is ever evicted.

pub mod job;
pub mod node;

// Re-export for convenience
pub use job as job_repository;
pub use node as node_repository;

use chrono::{DateTime, TimeDelta, Utc};
use grid_core::domain::job::Job;
use grid_core::domain::node::Node;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::clock::Clock;

/// Store shared by every request handler
///
/// Each collection sits behind its own lock; every mutation is a single
/// critical section and no guard outlives the call that took it.
pub struct Registry {
    nodes: RwLock<HashMap<String, Node>>,
    jobs: RwLock<HashMap<Uuid, Job>>,
    clock: Arc<dyn Clock>,
    liveness_timeout: TimeDelta,
}

impl Registry {
    pub fn new(clock: Arc<dyn Clock>, liveness_timeout: Duration) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
            clock,
            liveness_timeout: TimeDelta::from_std(liveness_timeout).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Maximum silence before a node reads as offline
    pub fn liveness_timeout(&self) -> TimeDelta {
        self.liveness_timeout
    }

    // A panic in another handler must not take the registry down with it,
    // so poisoned locks are recovered rather than propagated.

    fn nodes(&self) -> RwLockReadGuard<'_, HashMap<String, Node>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn nodes_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Node>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn jobs(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn jobs_mut(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("nodes", &self.nodes().len())
            .field("jobs", &self.jobs().len())
            .field("liveness_timeout", &self.liveness_timeout)
            .finish()
    }
}
