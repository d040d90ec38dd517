//! Capability executor: turns a model's tool call into a `ToolResult`.
//!
//! Every failure mode (unknown tool, malformed or schema-violating
//! arguments, store errors, timeouts, panics inside a handler) is folded
//! into `ToolResult::Failed` so the model can see and react to it. The
//! executor never returns an error to the orchestrator.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use agenda_common::Caller;
use agenda_store::AppointmentStore;

use crate::tools::{schema, ToolContext, ToolError, ToolRegistry};
use crate::ToolCall;

/// Outcome of one tool call, as fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ToolResult {
    Ok(Value),
    Failed(String),
}

impl ToolResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolResult::Ok(_))
    }

    /// Serialized form placed in the tool message's content.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"failed","data":"unencodable result: {e}"}}"#)
        })
    }
}

#[derive(Clone)]
pub struct Executor {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn AppointmentStore>,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            registry,
            store,
            timeout: None,
        }
    }

    /// Bound each tool invocation; an overrun becomes a failed result.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, call: &ToolCall, caller: &Caller) -> ToolResult {
        match self.dispatch(call, caller).await {
            Ok(data) => {
                debug!(tool = %call.name, call_id = %call.id, "tool succeeded");
                ToolResult::Ok(data)
            }
            Err(err) => {
                warn!(tool = %call.name, call_id = %call.id, error = %err, "tool failed");
                ToolResult::Failed(err.to_string())
            }
        }
    }

    /// Execute a batch. Results come back in request order whether the
    /// calls ran sequentially or concurrently.
    pub async fn execute_all(
        &self,
        calls: &[ToolCall],
        caller: &Caller,
        parallel: bool,
    ) -> Vec<ToolResult> {
        if parallel {
            return join_all(calls.iter().map(|call| self.execute(call, caller))).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call, caller).await);
        }
        results
    }

    async fn dispatch(&self, call: &ToolCall, caller: &Caller) -> Result<Value, ToolError> {
        let entry = self
            .registry
            .lookup(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        let args = parse_arguments(&call.arguments)?;
        schema::validate_args(&args, &entry.definition().parameters)
            .map_err(ToolError::InvalidArguments)?;

        let ctx = ToolContext {
            caller,
            store: self.store.as_ref(),
        };
        let invocation = AssertUnwindSafe(entry.tool().invoke(args, &ctx)).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, invocation).await.map_err(|_| {
                ToolError::Execution(format!("timed out after {}ms", limit.as_millis()))
            })?,
            None => invocation.await,
        };

        outcome.map_err(|panic| ToolError::Execution(panic_message(panic.as_ref())))?
    }
}

/// Empty argument text means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned());
    match detail {
        Some(detail) => format!("tool panicked: {detail}"),
        None => "tool panicked".to_string(),
    }
}

#[cfg(test)]
mod tests;
