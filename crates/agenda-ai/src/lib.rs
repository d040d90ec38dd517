//! Assistant engine for Agenda.
//!
//! Provides:
//! - OpenAI-compatible and Claude reasoning-service clients with retry
//! - The tool registry and the appointment tools
//! - The capability executor (validation, timeouts, failure folding)
//! - The conversation orchestrator and its caller-facing protocol
//! - Token usage tracking

pub mod claude;
pub mod executor;
mod http;
pub mod openai;
pub mod orchestrator;
pub mod protocol;
pub mod retry;
pub mod token_tracker;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use claude::{ClaudeClient, ClaudeConfig};
pub use executor::{Executor, ToolResult};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use orchestrator::{
    DisplayKind, DisplayMessage, Orchestrator, OrchestratorError, OrchestratorOptions, RunState,
    Transcript,
};
pub use protocol::{ChatReply, ChatRequest, ChatResponse};
pub use retry::RetryPolicy;
pub use token_tracker::TokenTracker;
pub use tools::{appointment_tools, RegistryError, Tool, ToolContext, ToolError, ToolRegistry};

/// A remote model that answers a conversation, optionally requesting tools.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Short provider label, used for token accounting and logs.
    fn provider(&self) -> &str;

    /// Submit the conversation. `tools` is the catalogue the model may call
    /// from; `None` means the model must answer in text.
    async fn converse(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AiResponse, AiError>;
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Set on tool messages: the id of the call this message answers.
    #[serde(default, alias = "toolCallId", skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, alias = "toolName", skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Set on assistant messages that requested tools.
    #[serde(default, alias = "toolCalls", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    /// Assistant turn that asked for `calls`.
    pub fn tool_request(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Tool turn carrying the serialized result of `call`.
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call.id.clone()),
            tool_name: Some(call.name.clone()),
            ..Self::plain(Role::Tool, content)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON-schema object describing the arguments.
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
///
/// `arguments` is the raw JSON text the model produced; it is only parsed
/// by the executor so malformed arguments become a tool failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// What the model wants next.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A final text answer.
    Answer(String),
    /// One or more tool calls, with any text emitted alongside them.
    ToolRequests { text: String, calls: Vec<ToolCall> },
}

impl Reply {
    pub fn from_parts(text: String, calls: Vec<ToolCall>) -> Self {
        if calls.is_empty() {
            Reply::Answer(text)
        } else {
            Reply::ToolRequests { text, calls }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub reply: Reply,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl AiError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AiError::RateLimited
                | AiError::ServerError(_)
                | AiError::NetworkError(_)
                | AiError::Timeout
        )
    }
}
