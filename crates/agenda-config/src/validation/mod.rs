//! Full configuration validation.
//!
//! Validates numeric ranges and required text fields, collecting every
//! problem into a single `ConfigError`.

mod helpers;


use crate::schema::AgendaConfig;
use agenda_common::ConfigError;

use helpers::{validate_not_blank, validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AgendaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_reasoning(&mut errors, config);
    validate_assistant(&mut errors, config);
    validate_store(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_reasoning(errors: &mut Vec<String>, config: &AgendaConfig) {
    let reasoning = &config.reasoning;
    validate_range(errors, "reasoning.max_tokens", reasoning.max_tokens, 1, 32768);
    validate_range_f64(
        errors,
        "reasoning.temperature",
        reasoning.temperature,
        0.0,
        2.0,
    );
    validate_range(errors, "reasoning.timeout_secs", reasoning.timeout_secs, 5, 600);
    validate_range(errors, "reasoning.max_retries", reasoning.max_retries, 0, 10);
    validate_range(
        errors,
        "reasoning.retry_backoff_ms",
        reasoning.retry_backoff_ms,
        0,
        60000,
    );
    if let Some(ref model) = reasoning.model {
        validate_not_blank(errors, "reasoning.model", model);
    }
}

fn validate_assistant(errors: &mut Vec<String>, config: &AgendaConfig) {
    let assistant = &config.assistant;
    validate_range(
        errors,
        "assistant.tool_timeout_secs",
        assistant.tool_timeout_secs,
        1,
        300,
    );
    validate_not_blank(errors, "assistant.error_message", &assistant.error_message);
}

fn validate_store(errors: &mut Vec<String>, config: &AgendaConfig) {
    validate_range(errors, "store.pool_size", config.store.pool_size, 1, 256);
}
