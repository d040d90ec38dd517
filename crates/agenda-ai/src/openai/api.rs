//! ReasoningClient implementation for OpenAiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::http::send_json;
use crate::{AiError, AiResponse, Message, ReasoningClient, ToolDefinition};

use super::client::OpenAiClient;

#[async_trait]
impl ReasoningClient for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn converse(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools);
        let url = self.completions_url();

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "OpenAI API request"
        );

        let json = self
            .config
            .retry
            .run(self.provider(), || {
                send_json(
                    self.http
                        .post(&url)
                        .bearer_auth(&self.config.api_key)
                        .json(&body),
                )
            })
            .await?;

        self.parse_response(json)
    }
}
