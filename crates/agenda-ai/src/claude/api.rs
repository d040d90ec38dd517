//! ReasoningClient implementation for ClaudeClient.

use async_trait::async_trait;
use tracing::debug;

use crate::http::send_json;
use crate::{AiError, AiResponse, Message, ReasoningClient, ToolDefinition};

use super::client::{ClaudeClient, ANTHROPIC_API_URL, ANTHROPIC_VERSION};

#[async_trait]
impl ReasoningClient for ClaudeClient {
    fn provider(&self) -> &str {
        "claude"
    }

    async fn converse(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools);

        debug!(model = %self.config.model, "Claude API request");

        let json = self
            .config
            .retry
            .run(self.provider(), || {
                send_json(
                    self.http
                        .post(ANTHROPIC_API_URL)
                        .header("x-api-key", &self.config.api_key)
                        .header("anthropic-version", ANTHROPIC_VERSION)
                        .header("content-type", "application/json")
                        .json(&body),
                )
            })
            .await?;

        self.parse_response(json)
    }
}
