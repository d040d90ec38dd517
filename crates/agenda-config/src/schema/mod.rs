//! Configuration schema types for Agenda.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod assistant;
mod reasoning;
mod store;
mod system;

pub use assistant::*;
pub use reasoning::*;
pub use store::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Agenda.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaConfig {
    pub reasoning: ReasoningConfig,
    pub assistant: AssistantConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
