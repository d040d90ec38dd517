//! Orchestrator state, display, and error types.

use serde::{Deserialize, Serialize};

use crate::token_tracker::TokenTracker;
use crate::{AiError, Message, Role};

/// Stages of one conversation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    AwaitingModel,
    DirectAnswer,
    ToolRequested,
    ExecutingTools,
    AwaitingModelFollowup,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    /// The model's answer.
    Reply,
    /// Short notice that tools are being used.
    ToolNotice,
    /// Apology shown when the run could not finish.
    Error,
}

/// A message meant for the person in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub role: Role,
    pub content: String,
    pub kind: DisplayKind,
}

impl DisplayMessage {
    fn assistant(content: impl Into<String>, kind: DisplayKind) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind,
        }
    }

    pub fn reply(content: impl Into<String>) -> Self {
        Self::assistant(content, DisplayKind::Reply)
    }

    pub fn tool_notice(content: impl Into<String>) -> Self {
        Self::assistant(content, DisplayKind::ToolNotice)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::assistant(content, DisplayKind::Error)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// The caller's history plus every message this run appended.
    pub history: Vec<Message>,
    /// Messages to show, in order.
    pub display: Vec<DisplayMessage>,
    /// Token usage of this run, per provider.
    pub usage: TokenTracker,
    /// States visited, in order.
    pub states: Vec<RunState>,
    pub model_rounds: u32,
    pub tool_rounds: u32,
}

impl Transcript {
    /// The final answer text.
    pub fn reply(&self) -> Option<&str> {
        self.display
            .iter()
            .rev()
            .find(|m| m.kind == DisplayKind::Reply)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("reasoning service unavailable: {0}")]
    ReasoningServiceUnavailable(#[from] AiError),
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl OrchestratorError {
    /// Status reported to the caller for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            OrchestratorError::ReasoningServiceUnavailable(_) => 502,
            OrchestratorError::ProtocolViolation(_) => 422,
        }
    }

    /// Short category for the response's `error` field.
    pub fn summary(&self) -> &'static str {
        match self {
            OrchestratorError::ReasoningServiceUnavailable(_) => "reasoning service unavailable",
            OrchestratorError::ProtocolViolation(_) => "protocol violation",
        }
    }
}

/// Behaviour knobs, usually filled from `[assistant]` config.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Template with `{now}` and `{user_name}` placeholders; sent as the
    /// first message of every round but never stored in the history.
    pub system_prompt: Option<String>,
    /// Prefix for tool notices; `None` disables them.
    pub tool_notice_prefix: Option<String>,
    pub parallel_tools: bool,
    /// Apology shown when a run fails.
    pub error_message: String,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            tool_notice_prefix: Some("🔧".to_string()),
            parallel_tools: false,
            error_message: "Sorry, something went wrong. Could you try again?".to_string(),
        }
    }
}
