//! Service Module
//!
//! Business logic layer for the hub.
//! Services validate caller input, apply the liveness rule and the job
//! state machine, and delegate storage to the repositories.

pub mod job;
pub mod log;
pub mod node;

// Re-export for convenience
pub use job as job_service;
pub use log as log_service;
pub use node as node_service;
