//! Appointment tools: create, list, update, delete.
//!
//! Each handler decodes its typed arguments, runs exactly one store
//! operation scoped to the caller, and returns the affected record(s).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use agenda_store::{parse_timestamp, AppointmentChanges, NewAppointment};

use crate::ToolDefinition;

use super::registry::{RegistryError, ToolRegistry};
use super::{decode_args, Tool, ToolContext, ToolError};

const TIMESTAMP_HINT: &str =
    "ISO 8601 date-time, e.g. 2026-03-14T15:00:00Z. Times without an offset are read as UTC.";

/// Registry holding the four appointment tools.
pub fn appointment_tools() -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::builder()
        .register(CreateAppointment)
        .register(GetAppointments)
        .register(UpdateAppointment)
        .register(DeleteAppointment)
        .build()
}

pub struct CreateAppointment;
pub struct GetAppointments;
pub struct UpdateAppointment;
pub struct DeleteAppointment;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateArgs {
    title: String,
    start_time: String,
    end_time: String,
}

#[derive(Debug, Deserialize)]
struct ListArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateArgs {
    id: i64,
    title: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteArgs {
    id: i64,
}

#[async_trait]
impl Tool for CreateAppointment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_appointment".into(),
            description: "Create a new appointment for the user.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Short description of the appointment"
                    },
                    "start_time": {"type": "string", "description": TIMESTAMP_HINT},
                    "end_time": {"type": "string", "description": TIMESTAMP_HINT}
                },
                "required": ["title", "start_time", "end_time"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let args: CreateArgs = decode_args(args)?;
        let appointment = NewAppointment {
            title: args.title,
            start_time: timestamp("start_time", &args.start_time)?,
            end_time: timestamp("end_time", &args.end_time)?,
        };
        let created = ctx.store.create(ctx.caller.user_id(), appointment).await?;
        payload(&created)
    }
}

#[async_trait]
impl Tool for GetAppointments {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_appointments".into(),
            description: "List the user's appointments, ordered by start time.".into(),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let _: ListArgs = decode_args(args)?;
        let appointments = ctx.store.list(ctx.caller.user_id()).await?;
        payload(&appointments)
    }
}

#[async_trait]
impl Tool for UpdateAppointment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_appointment".into(),
            description: "Change the title or times of an existing appointment. \
                          Only the fields given are changed."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "description": "Id of the appointment to change"},
                    "title": {"type": "string"},
                    "start_time": {"type": "string", "description": TIMESTAMP_HINT},
                    "end_time": {"type": "string", "description": TIMESTAMP_HINT}
                },
                "required": ["id"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let args: UpdateArgs = decode_args(args)?;
        let changes = AppointmentChanges {
            title: args.title,
            start_time: optional_timestamp("start_time", args.start_time.as_deref())?,
            end_time: optional_timestamp("end_time", args.end_time.as_deref())?,
        };
        if changes.is_empty() {
            return Err(ToolError::InvalidArguments(
                "provide at least one of title, start_time, end_time".into(),
            ));
        }
        let updated = ctx
            .store
            .update(ctx.caller.user_id(), args.id, changes)
            .await?;
        payload(&updated)
    }
}

#[async_trait]
impl Tool for DeleteAppointment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "delete_appointment".into(),
            description: "Delete an appointment by id.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "description": "Id of the appointment to delete"}
                },
                "required": ["id"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let args: DeleteArgs = decode_args(args)?;
        let deleted = ctx.store.delete(ctx.caller.user_id(), args.id).await?;
        Ok(json!({ "deleted": payload(&deleted)? }))
    }
}

fn timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ToolError> {
    parse_timestamp(raw).map_err(|e| ToolError::InvalidArguments(format!("{field}: {e}")))
}

fn optional_timestamp(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ToolError> {
    raw.map(|raw| timestamp(field, raw)).transpose()
}

fn payload<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::Execution(format!("failed to encode result: {e}")))
}
