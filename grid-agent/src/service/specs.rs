//! Specs service
//!
//! Describes this machine for the hub's node listing. The hub treats specs
//! as opaque, so this is purely informational.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use sysinfo::System;
use tracing::{info, warn};

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Service trait for machine description
pub trait SpecsService: Send + Sync {
    /// Collects the key/value description sent with every registration
    fn discover(&self) -> Result<HashMap<String, Value>>;
}

/// Standard implementation of SpecsService
///
/// Reports CPU count, total memory, OS and architecture; operator labels
/// are merged on top and win on key collisions.
pub struct StandardSpecsService {
    labels: HashMap<String, String>,
}

impl StandardSpecsService {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }
}

impl SpecsService for StandardSpecsService {
    fn discover(&self) -> Result<HashMap<String, Value>> {
        info!("Discovering node specs");

        let cpus = std::thread::available_parallelism()
            .context("Failed to determine available CPU count")?;

        let mut specs = HashMap::new();
        specs.insert("cpu".to_string(), Value::from(format!("{} vCPU", cpus)));

        let mut system = System::new();
        system.refresh_memory();
        match system.total_memory() {
            0 => warn!("Could not read total memory; not reporting ram"),
            bytes => {
                specs.insert("ram".to_string(), Value::from(format_ram(bytes)));
            }
        }

        specs.insert("os".to_string(), Value::from(std::env::consts::OS));
        specs.insert("arch".to_string(), Value::from(std::env::consts::ARCH));

        for (key, value) in &self.labels {
            specs.insert(key.clone(), Value::from(value.as_str()));
        }

        info!("Discovered {} spec entries", specs.len());

        Ok(specs)
    }
}

/// Whole gigabytes, or megabytes below one gigabyte
fn format_ram(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{}GB", (bytes + GIB / 2) / GIB)
    } else {
        format!("{}MB", bytes / MIB)
    }
}
