//! Reasoning service (LLM provider) configuration.

use serde::{Deserialize, Serialize};

/// Which remote reasoning service to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningProvider {
    /// OpenAI Chat Completions, or any compatible endpoint via `base_url`.
    #[default]
    OpenAi,
    /// Anthropic Messages API.
    Claude,
}

/// Reasoning service configuration.
///
/// Credentials are never stored here; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub provider: ReasoningProvider,
    /// Model name; `None` uses the provider's default.
    pub model: Option<String>,
    /// Override the provider endpoint (OpenAI-compatible servers).
    pub base_url: Option<String>,
    /// Valid range: 1-32768.
    pub max_tokens: u32,
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    /// Per-request timeout in seconds (valid range: 5-600).
    pub timeout_secs: u32,
    /// Retries on rate limits and transient failures (valid range: 0-10).
    pub max_retries: u32,
    /// Initial backoff between retries in milliseconds (valid range: 0-60000).
    pub retry_backoff_ms: u32,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: ReasoningProvider::OpenAi,
            model: None,
            base_url: None,
            max_tokens: 1024,
            temperature: 0.3,
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}
