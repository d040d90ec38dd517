//! Anthropic Claude client.
//!
//! Implements `ReasoningClient` for Claude models via the Anthropic
//! Messages API (https://api.anthropic.com/v1/messages). Tool requests
//! and results travel as `tool_use` / `tool_result` content blocks.

mod api;
mod client;
mod config;

pub use client::ClaudeClient;
pub use config::{ClaudeConfig, DEFAULT_CLAUDE_MODEL};
