//! Tools the assistant can invoke.
//!
//! A tool pairs a `ToolDefinition` (name, description, parameter schema)
//! with an async handler. Tools are collected into an immutable
//! `ToolRegistry` at startup and dispatched by the executor.

mod appointments;
pub mod registry;
pub mod schema;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use agenda_common::{Caller, StoreError};
use agenda_store::AppointmentStore;

use crate::ToolDefinition;

pub use appointments::{
    appointment_tools, CreateAppointment, DeleteAppointment, GetAppointments, UpdateAppointment,
};
pub use registry::{RegisteredTool, RegistryError, ToolRegistry, ToolRegistryBuilder};

/// What a handler may see of the surrounding request.
pub struct ToolContext<'a> {
    pub caller: &'a Caller,
    pub store: &'a dyn AppointmentStore,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("store operation failed: {0}")]
    StoreOperationFailed(#[from] StoreError),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. `args` has already passed the parameter schema.
    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value, ToolError>;
}

/// Decode validated arguments into a handler's typed argument struct.
pub fn decode_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Convert a definition to OpenAI function-tool format.
pub fn to_openai_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

/// Convert a definition to Claude API tool format.
pub fn to_claude_tool(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.parameters,
    })
}
