//! Conversational assistant behaviour.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful scheduling assistant. \
You manage appointments for {user_name} using the tools provided: create, list, \
update and delete appointments. The current date and time is {now} (UTC). \
Resolve relative dates such as \"tomorrow\" against it and always send \
timestamps as RFC 3339. Reply in the same language the user writes in, \
briefly and in plain text.";

/// Assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Template with `{now}` and `{user_name}` placeholders.
    pub system_prompt: String,
    /// Show a notice in the transcript when a tool round runs.
    pub show_tool_notices: bool,
    pub tool_notice_prefix: String,
    /// Run the tool calls of one round concurrently.
    pub parallel_tools: bool,
    /// Upper bound for a single tool invocation (valid range: 1-300).
    pub tool_timeout_secs: u32,
    /// Plain text shown to the user when a run has to be aborted.
    pub error_message: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            show_tool_notices: true,
            tool_notice_prefix: "🔧".into(),
            parallel_tools: false,
            tool_timeout_secs: 10,
            error_message: "Sorry, something went wrong. Could you try again?".into(),
        }
    }
}
