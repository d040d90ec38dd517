//! Agenda configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use agenda_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    AgendaConfig, AssistantConfig, LogLevel, LoggingConfig, ReasoningConfig, ReasoningProvider,
    StoreConfig, CONFIG_SCHEMA_VERSION,
};

use agenda_common::ConfigError;
use std::path::Path;

/// Load and validate the config.
///
/// With `path`, that file must exist. Without it, the platform default path
/// is used and a commented default file is created if none exists.
pub fn load_config(path: Option<&Path>) -> Result<AgendaConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &AgendaConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = AgendaConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"reasoning\""));
        assert!(json.contains("\"assistant\""));
        assert!(json.contains("\"store\""));
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"openai\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = AgendaConfig::default();
        let json = config_to_json(&config);
        let parsed: AgendaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reasoning.provider, ReasoningProvider::OpenAi);
        assert_eq!(parsed.assistant.tool_notice_prefix, "🔧");
    }

    #[test]
    fn load_config_rejects_invalid_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reasoning]\ntemperature = 9.0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("reasoning.temperature"));
    }

    #[test]
    fn load_config_requires_explicit_file_to_exist() {
        let err = load_config(Some(Path::new("/tmp/agenda_missing_config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
