//! Conversation orchestrator.
//!
//! Drives one turn of a conversation: submit the history with the tool
//! catalogue, execute any requested tools, then submit once more without
//! tools for the final answer. At most one tool round happens per run.
//!
//! ```text
//! AwaitingModel ──answer──▶ DirectAnswer ──▶ Done
//!       │
//!       └─tools─▶ ToolRequested ─▶ ExecutingTools ─▶ AwaitingModelFollowup ─▶ Done
//! ```

mod history;
mod run;
mod types;

use std::sync::Arc;

use tracing::error;

use crate::executor::Executor;
use crate::protocol::{ChatReply, ChatRequest};
use crate::ReasoningClient;

pub use types::{
    DisplayKind, DisplayMessage, OrchestratorError, OrchestratorOptions, RunState, Transcript,
};

pub struct Orchestrator {
    client: Arc<dyn ReasoningClient>,
    executor: Executor,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn ReasoningClient>, executor: Executor) -> Self {
        Self {
            client,
            executor,
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Handle one caller request end to end.
    ///
    /// Failures never escape as errors: the caller gets a status code and
    /// a single apology message instead.
    pub async fn respond(&self, request: ChatRequest) -> ChatReply {
        let caller = request.caller();
        match self.run(request.messages, &caller).await {
            Ok(transcript) => ChatReply::display(transcript.display),
            Err(err) => {
                error!(error = %err, status = err.status_code(), "conversation run failed");
                ChatReply::failure(&err, &self.options.error_message)
            }
        }
    }
}

#[cfg(test)]
mod tests;
