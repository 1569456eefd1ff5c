//! Grid Core
//!
//! Core types and abstractions for the Grid compute mesh.
//!
//! This crate contains:
//! - Domain types: Core entities (Node, Job) and the job state machine
//! - DTOs: Data transfer objects for hub/agent/client communication

pub mod domain;
pub mod dto;
