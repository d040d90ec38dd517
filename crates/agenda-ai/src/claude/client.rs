//! Claude client struct, request building, and response parsing.

use std::sync::{Mutex, PoisonError};

use serde_json::{json, Value};

use agenda_common::new_id;

use crate::executor::ToolResult;
use crate::http::build_http;
use crate::tools::to_claude_tool;
use crate::{AiError, AiResponse, Message, Reply, Role, TokenUsage, ToolCall, ToolDefinition};

use super::config::ClaudeConfig;

pub(crate) const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API client.
pub struct ClaudeClient {
    pub(crate) config: ClaudeConfig,
    pub(crate) http: reqwest::Client,
    /// Last tool catalogue offered, replayed on rounds that offer none.
    catalogue: Mutex<Vec<ToolDefinition>>,
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Result<Self, AiError> {
        let http = build_http(config.timeout)?;
        Ok(Self {
            config,
            http,
            catalogue: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ClaudeConfig {
        &self.config
    }

    /// Build the Messages API body.
    ///
    /// System messages are lifted into the top-level `system` field. Tool
    /// results become `tool_result` blocks on a user turn; consecutive
    /// results share one turn, as the API requires.
    ///
    /// The API refuses `tool_use`/`tool_result` blocks without a `tools`
    /// list, so a round that offers no tools but carries tool blocks resends
    /// the last catalogue with `tool_choice: none`.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Value {
        let mut system = Vec::new();
        let mut turns: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system.push(msg.content.as_str()),
                Role::User => turns.push(json!({ "role": "user", "content": msg.content })),
                Role::Assistant if msg.tool_calls.is_empty() => {
                    turns.push(json!({ "role": "assistant", "content": msg.content }))
                }
                Role::Assistant => turns.push(tool_use_turn(msg)),
                Role::Tool => push_tool_result(&mut turns, msg),
            }
        }

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": turns,
        });

        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }

        match tools.filter(|t| !t.is_empty()) {
            Some(tools) => {
                *self.catalogue.lock().unwrap_or_else(PoisonError::into_inner) = tools.to_vec();
                let defs: Vec<Value> = tools.iter().map(to_claude_tool).collect();
                body["tools"] = json!(defs);
                body["tool_choice"] = json!({ "type": "auto" });
            }
            None if carries_tool_blocks(messages) => {
                body["tools"] = json!(self.replayed_tools(messages));
                body["tool_choice"] = json!({ "type": "none" });
            }
            None => {}
        }

        body
    }

    /// The remembered catalogue, plus a bare definition for any tool named
    /// in the history that it does not cover.
    fn replayed_tools(&self, messages: &[Message]) -> Vec<Value> {
        let catalogue = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&str> = catalogue.iter().map(|t| t.name.as_str()).collect();
        let mut defs: Vec<Value> = catalogue.iter().map(to_claude_tool).collect();

        let used = messages
            .iter()
            .flat_map(|m| m.tool_calls.iter().map(|c| c.name.as_str()));
        for name in used {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
                defs.push(json!({
                    "name": name,
                    "description": "",
                    "input_schema": { "type": "object" },
                }));
            }
        }
        defs
    }

    pub(crate) fn parse_response(&self, json: Value) -> Result<AiResponse, AiError> {
        let blocks = json["content"]
            .as_array()
            .ok_or_else(|| AiError::ParseError("response has no content blocks".into()))?;

        let text = blocks
            .iter()
            .filter(|b| b["type"] == "text")
            .filter_map(|b| b["text"].as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let calls = blocks
            .iter()
            .filter(|b| b["type"] == "tool_use")
            .map(|b| ToolCall {
                id: b["id"]
                    .as_str()
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .unwrap_or_else(new_id),
                name: b["name"].as_str().unwrap_or_default().to_string(),
                arguments: match &b["input"] {
                    Value::Null => String::new(),
                    input => input.to_string(),
                },
            })
            .collect();

        let usage = TokenUsage {
            input_tokens: json["usage"]["input_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["output_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse {
            reply: Reply::from_parts(text, calls),
            usage,
        })
    }
}

fn carries_tool_blocks(messages: &[Message]) -> bool {
    messages
        .iter()
        .any(|m| m.role == Role::Tool || (m.role == Role::Assistant && !m.tool_calls.is_empty()))
}

fn tool_use_turn(msg: &Message) -> Value {
    let mut blocks = Vec::new();
    if !msg.content.is_empty() {
        blocks.push(json!({ "type": "text", "text": msg.content }));
    }
    for call in &msg.tool_calls {
        let input: Value = serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({}));
        blocks.push(json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.name,
            "input": input,
        }));
    }
    json!({ "role": "assistant", "content": blocks })
}

fn push_tool_result(turns: &mut Vec<Value>, msg: &Message) {
    let mut block = json!({
        "type": "tool_result",
        "tool_use_id": msg.tool_call_id.as_deref().unwrap_or_default(),
        "content": msg.content,
    });
    let failed = serde_json::from_str::<ToolResult>(&msg.content).is_ok_and(|r| !r.is_ok());
    if failed {
        block["is_error"] = json!(true);
    }

    if let Some(last) = turns.last_mut() {
        let is_result_turn = last["role"] == "user"
            && last["content"]
                .as_array()
                .and_then(|blocks| blocks.first())
                .is_some_and(|b| b["type"] == "tool_result");
        if is_result_turn {
            if let Some(blocks) = last["content"].as_array_mut() {
                blocks.push(block);
                return;
            }
        }
    }

    turns.push(json!({ "role": "user", "content": [block] }));
}
