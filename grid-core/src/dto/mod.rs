//! Data Transfer Objects for inter-service communication
//!
//! This module contains the request/response bodies exchanged between the
//! hub, the heartbeat agent and clients.

pub mod job;
pub mod node;
