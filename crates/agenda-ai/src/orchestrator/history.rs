//! History checks and per-round message assembly.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};

use agenda_common::Caller;

use crate::{Message, Role};

use super::types::OrchestratorError;

/// Reject histories the reasoning service could not make sense of: an
/// empty history, or a tool message that answers no earlier tool call.
pub(crate) fn validate_history(history: &[Message]) -> Result<(), OrchestratorError> {
    if history.is_empty() {
        return Err(OrchestratorError::ProtocolViolation(
            "conversation history is empty".into(),
        ));
    }

    let mut requested: HashSet<&str> = HashSet::new();
    for (index, msg) in history.iter().enumerate() {
        match msg.role {
            Role::Assistant => requested.extend(msg.tool_calls.iter().map(|c| c.id.as_str())),
            Role::Tool => {
                let id = msg.tool_call_id.as_deref().ok_or_else(|| {
                    OrchestratorError::ProtocolViolation(format!(
                        "tool message at position {index} has no tool_call_id"
                    ))
                })?;
                if !requested.contains(id) {
                    return Err(OrchestratorError::ProtocolViolation(format!(
                        "tool message at position {index} answers unknown tool call '{id}'"
                    )));
                }
            }
            Role::User | Role::System => {}
        }
    }
    Ok(())
}

pub(crate) fn render_system_prompt(template: &str, caller: &Caller, now: DateTime<Utc>) -> String {
    template
        .replace("{now}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{user_name}", caller.display_name())
}

/// The messages for one round: the system prompt (if any) then the history.
pub(crate) fn round_messages(system: Option<&Message>, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend(system.cloned());
    messages.extend_from_slice(history);
    messages
}
