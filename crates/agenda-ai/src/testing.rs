//! Test doubles shared by the executor and orchestrator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use agenda_store::{AppointmentStore, MemoryStore};

use crate::executor::Executor;
use crate::tools::{appointment_tools, Tool, ToolContext, ToolError, ToolRegistry};
use crate::{
    AiError, AiResponse, Message, ReasoningClient, Reply, TokenUsage, ToolCall, ToolDefinition,
};

/// What the orchestrator submitted in one round.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// A reasoning client that replays queued replies and records submissions.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<AiResponse, AiError>>>,
    submissions: Mutex<Vec<Submission>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, text: &str) -> Self {
        self.push(Ok(response(Reply::Answer(text.to_string()))))
    }

    pub fn tool_requests(self, text: &str, calls: Vec<ToolCall>) -> Self {
        self.push(Ok(response(Reply::ToolRequests {
            text: text.to_string(),
            calls,
        })))
    }

    pub fn fail(self, err: AiError) -> Self {
        self.push(Err(err))
    }

    fn push(self, reply: Result<AiResponse, AiError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningClient for ScriptedClient {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn converse(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AiResponse, AiError> {
        self.submissions.lock().unwrap().push(Submission {
            messages: messages.to_vec(),
            tools: tools.map(|t| t.to_vec()),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::ApiError("script exhausted".into())))
    }
}

fn response(reply: Reply) -> AiResponse {
    AiResponse {
        reply,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

pub(crate) fn call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}

/// Executor over the appointment tools and a fresh in-memory store.
pub(crate) fn appointment_executor() -> (Executor, MemoryStore) {
    let store = MemoryStore::new();
    let registry = appointment_tools().unwrap();
    let shared: Arc<dyn AppointmentStore> = Arc::new(store.clone());
    (Executor::new(Arc::new(registry), shared), store)
}

/// Tool that panics on every call.
pub(crate) struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "explode".into(),
            description: "Always panics".into(),
            parameters: json!({"type": "object"}),
        }
    }

    async fn invoke(&self, _args: Value, _ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        panic!("boom");
    }
}

/// Tool that sleeps for `delay` and reports how many calls overlapped.
pub(crate) struct SlowTool {
    pub delay: Duration,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl SlowTool {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for SlowTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "slow".into(),
            description: "Sleeps, then echoes its tag".into(),
            parameters: json!({
                "type": "object",
                "properties": {"tag": {"type": "string"}}
            }),
        }
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(args.get("tag").cloned().unwrap_or(Value::Null))
    }
}

/// Executor over arbitrary extra tools plus a fresh store.
pub(crate) fn executor_with(registry: ToolRegistry) -> Executor {
    let store: Arc<dyn AppointmentStore> = Arc::new(MemoryStore::new());
    Executor::new(Arc::new(registry), store)
}
