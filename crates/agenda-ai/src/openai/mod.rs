//! OpenAI-compatible Chat Completions client.
//!
//! Implements `ReasoningClient` against `/chat/completions` on the
//! configured base URL, so any OpenAI-compatible endpoint works.

mod api;
mod client;
mod config;

pub use client::OpenAiClient;
pub use config::{OpenAiConfig, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
