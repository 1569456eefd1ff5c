//! Job polling
//!
//! Client side of the polling contract: read the whole job at a fixed
//! interval until it reaches a terminal status. Every read returns the
//! complete log, so a poller that misses an intermediate state still
//! converges.

use async_trait::async_trait;
use grid_core::domain::job::Job;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::HubClient;
use crate::error::Result;

/// Default delay between two reads of a job
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest accepted delay between two reads
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default number of consecutive transient failures tolerated
pub const DEFAULT_MAX_TRANSIENT_FAILURES: u32 = 5;

/// Anything a job snapshot can be read from
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_job(&self, job_id: Uuid) -> Result<Job>;
}

#[async_trait]
impl JobSource for HubClient {
    async fn fetch_job(&self, job_id: Uuid) -> Result<Job> {
        self.get_job(job_id).await
    }
}

/// Polls a job until it completes or fails
#[derive(Debug, Clone)]
pub struct JobPoller {
    interval: Duration,
    max_transient_failures: u32,
}

impl JobPoller {
    /// Creates a poller reading every `interval`, at least [`MIN_POLL_INTERVAL`]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            max_transient_failures: DEFAULT_MAX_TRANSIENT_FAILURES,
        }
    }

    /// Sets how many consecutive transient failures are retried before giving up
    pub fn with_max_transient_failures(mut self, max: u32) -> Self {
        self.max_transient_failures = max;
        self
    }

    /// Waits for the job to reach a terminal status
    pub async fn wait<S>(&self, source: &S, job_id: Uuid) -> Result<Job>
    where
        S: JobSource + ?Sized,
    {
        self.watch(source, job_id, |_| {}).await
    }

    /// Waits for the job to reach a terminal status, handing every
    /// snapshot read along the way to `on_update`
    ///
    /// A not-found answer stops polling at once: job IDs are never
    /// deleted, so an unknown ID will never become known. Transient
    /// failures are retried until `max_transient_failures` happen in a row.
    pub async fn watch<S, F>(&self, source: &S, job_id: Uuid, mut on_update: F) -> Result<Job>
    where
        S: JobSource + ?Sized,
        F: FnMut(&Job) + Send,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0;

        loop {
            ticker.tick().await;

            match source.fetch_job(job_id).await {
                Ok(job) => {
                    failures = 0;
                    on_update(&job);

                    if job.status.is_terminal() {
                        debug!("Job {} reached terminal status {}", job_id, job.status);
                        return Ok(job);
                    }
                }
                Err(e) if e.is_transient() && failures < self.max_transient_failures => {
                    failures += 1;
                    warn!(
                        "Failed to poll job {} ({}/{}): {}",
                        job_id, failures, self.max_transient_failures, e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}
