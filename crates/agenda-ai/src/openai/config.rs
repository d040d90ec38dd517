//! OpenAI client configuration.

use std::fmt;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::AiError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }

    /// Build from `OPENAI_API_KEY`, honouring `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` when set.
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AiError::NotConfigured("OpenAI API not configured. Set OPENAI_API_KEY.".into())
            })?;

        let mut config = Self::new(api_key);
        if let Some(url) = non_empty_env("OPENAI_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(model) = non_empty_env("OPENAI_MODEL") {
            config = config.with_model(model);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = OpenAiConfig::new("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = OpenAiConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = OpenAiConfig::new("k")
            .with_model("gpt-4o")
            .with_max_tokens(256)
            .with_temperature(0.0)
            .with_retry(RetryPolicy::none());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.retry.max_retries, 0);
    }
}
