//! Core domain types
//!
//! This module contains the core domain structures used across Grid services.
//! These types are owned by the hub (which stores them) and read by agents
//! and clients (which only ever see snapshots).

pub mod job;
pub mod node;
