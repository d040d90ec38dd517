use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Appointment store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Concurrent store operations (valid range: 1-256).
    pub pool_size: u32,
    /// JSON file of appointments loaded at startup.
    pub seed_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            seed_file: None,
        }
    }
}
