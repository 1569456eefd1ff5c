//! Service layer for the agent
//!
//! Local discovery of what this machine reports to the hub.

pub mod specs;

pub use specs::{SpecsService, StandardSpecsService};
