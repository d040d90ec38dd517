//! The run state machine.

use chrono::Utc;
use tracing::{debug, info, Instrument};

use agenda_common::{new_correlation_id, Caller};

use crate::token_tracker::TokenTracker;
use crate::{Message, Reply, ToolCall, ToolDefinition};

use super::history::{render_system_prompt, round_messages, validate_history};
use super::types::{DisplayMessage, OrchestratorError, RunState, Transcript};
use super::Orchestrator;

/// State plus the data each transition carries forward.
enum Step {
    AwaitingModel,
    DirectAnswer(String),
    ToolRequested { text: String, calls: Vec<ToolCall> },
    ExecutingTools(Vec<ToolCall>),
    AwaitingModelFollowup,
    Done,
}

impl Step {
    fn state(&self) -> RunState {
        match self {
            Step::AwaitingModel => RunState::AwaitingModel,
            Step::DirectAnswer(_) => RunState::DirectAnswer,
            Step::ToolRequested { .. } => RunState::ToolRequested,
            Step::ExecutingTools(_) => RunState::ExecutingTools,
            Step::AwaitingModelFollowup => RunState::AwaitingModelFollowup,
            Step::Done => RunState::Done,
        }
    }
}

impl Orchestrator {
    /// Run one conversation turn over `history` on behalf of `caller`.
    pub async fn run(
        &self,
        history: Vec<Message>,
        caller: &Caller,
    ) -> Result<Transcript, OrchestratorError> {
        let span = tracing::info_span!(
            "run",
            id = %new_correlation_id(),
            user = caller.user_id().unwrap_or("-")
        );
        self.run_inner(history, caller).instrument(span).await
    }

    async fn run_inner(
        &self,
        mut history: Vec<Message>,
        caller: &Caller,
    ) -> Result<Transcript, OrchestratorError> {
        validate_history(&history)?;

        let system = self
            .options
            .system_prompt
            .as_deref()
            .map(|template| Message::system(render_system_prompt(template, caller, Utc::now())));
        let catalogue = Some(self.executor.registry().catalogue()).filter(|c| !c.is_empty());

        let mut tracker = TokenTracker::new();
        let mut display = Vec::new();
        let mut states = Vec::new();
        let mut tool_rounds = 0;
        let mut step = Step::AwaitingModel;

        loop {
            let state = step.state();
            debug!(?state, "entering state");
            states.push(state);

            step = match step {
                Step::AwaitingModel => {
                    match self
                        .submit(system.as_ref(), &history, catalogue, &mut tracker)
                        .await?
                    {
                        Reply::Answer(text) => Step::DirectAnswer(text),
                        Reply::ToolRequests { text, calls } => Step::ToolRequested { text, calls },
                    }
                }
                Step::DirectAnswer(text) => {
                    history.push(Message::assistant(text.clone()));
                    display.push(DisplayMessage::reply(text));
                    Step::Done
                }
                Step::ToolRequested { text, calls } => {
                    history.push(Message::tool_request(text, calls.clone()));
                    Step::ExecutingTools(calls)
                }
                Step::ExecutingTools(calls) => {
                    if let Some(prefix) = self.options.tool_notice_prefix.as_deref() {
                        display.push(DisplayMessage::tool_notice(tool_notice(prefix, &calls)));
                    }
                    let results = self
                        .executor
                        .execute_all(&calls, caller, self.options.parallel_tools)
                        .await;
                    let failed = results.iter().filter(|r| !r.is_ok()).count();
                    info!(calls = calls.len(), failed, "tool round finished");

                    for (call, result) in calls.iter().zip(&results) {
                        history.push(Message::tool_result(call, result.to_content()));
                    }
                    tool_rounds += 1;
                    Step::AwaitingModelFollowup
                }
                Step::AwaitingModelFollowup => {
                    match self
                        .submit(system.as_ref(), &history, None, &mut tracker)
                        .await?
                    {
                        Reply::Answer(text) => {
                            history.push(Message::assistant(text.clone()));
                            display.push(DisplayMessage::reply(text));
                            Step::Done
                        }
                        Reply::ToolRequests { calls, .. } => {
                            return Err(OrchestratorError::ProtocolViolation(format!(
                                "{} tool call(s) requested in the follow-up round",
                                calls.len()
                            )));
                        }
                    }
                }
                Step::Done => break,
            };
        }

        Ok(Transcript {
            history,
            display,
            model_rounds: tracker.call_count() as u32,
            usage: tracker,
            states,
            tool_rounds,
        })
    }

    async fn submit(
        &self,
        system: Option<&Message>,
        history: &[Message],
        tools: Option<&[ToolDefinition]>,
        tracker: &mut TokenTracker,
    ) -> Result<Reply, OrchestratorError> {
        let messages = round_messages(system, history);
        let response = self.client.converse(&messages, tools).await?;
        tracker.record(self.client.provider(), &response.usage);
        Ok(response.reply)
    }
}

/// One notice per tool round, naming the tools in request order.
fn tool_notice(prefix: &str, calls: &[ToolCall]) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(calls.len());
    for call in calls {
        if !names.contains(&call.name.as_str()) {
            names.push(&call.name);
        }
    }
    format!("{prefix} Using {}", names.join(", "))
}
