//! OpenAI client struct, request building, and response parsing.

use serde_json::{json, Value};

use agenda_common::new_id;

use crate::http::build_http;
use crate::tools::to_openai_tool;
use crate::{AiError, AiResponse, Message, Reply, Role, TokenUsage, ToolCall, ToolDefinition};

use super::config::OpenAiConfig;

/// Chat Completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = build_http(config.timeout)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Build the JSON request body. The tool list is only sent when the
    /// round offers a catalogue.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Value {
        let msgs: Vec<Value> = messages.iter().map(to_openai_message).collect();

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": msgs,
        });

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            let defs: Vec<Value> = tools.iter().map(to_openai_tool).collect();
            body["tools"] = json!(defs);
            body["tool_choice"] = json!("auto");
        }

        body
    }

    pub(crate) fn parse_response(&self, json: Value) -> Result<AiResponse, AiError> {
        let message = json["choices"]
            .get(0)
            .map(|choice| &choice["message"])
            .ok_or_else(|| AiError::ParseError("response has no choices".into()))?;

        let content = message["content"].as_str().unwrap_or_default().to_string();

        let calls = message["tool_calls"]
            .as_array()
            .map(|calls| calls.iter().map(parse_tool_call).collect())
            .unwrap_or_default();

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse {
            reply: Reply::from_parts(content, calls),
            usage,
        })
    }
}

fn to_openai_message(msg: &Message) -> Value {
    match msg.role {
        Role::System => json!({ "role": "system", "content": msg.content }),
        Role::User => json!({ "role": "user", "content": msg.content }),
        Role::Assistant if msg.tool_calls.is_empty() => {
            json!({ "role": "assistant", "content": msg.content })
        }
        Role::Assistant => {
            let calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|call| {
                    let arguments = if call.arguments.trim().is_empty() {
                        "{}"
                    } else {
                        call.arguments.as_str()
                    };
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": { "name": call.name, "arguments": arguments },
                    })
                })
                .collect();
            let content = if msg.content.is_empty() {
                Value::Null
            } else {
                json!(msg.content)
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": msg.tool_call_id.as_deref().unwrap_or_default(),
            "content": msg.content,
        }),
    }
}

fn parse_tool_call(raw: &Value) -> ToolCall {
    let id = raw["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(String::from)
        .unwrap_or_else(new_id);
    let function = &raw["function"];
    // Arguments arrive as JSON text; some compatible servers send an object.
    let arguments = match &function["arguments"] {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    ToolCall {
        id,
        name: function["name"].as_str().unwrap_or_default().to_string(),
        arguments,
    }
}
