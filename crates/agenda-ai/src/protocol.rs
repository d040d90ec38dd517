//! Caller-facing request and response shapes.
//!
//! A request carries the full history plus the caller's identity; the
//! reply pairs an HTTP-style status with a body holding the messages to
//! display.

use serde::{Deserialize, Serialize};

use agenda_common::caller::deserialize_opt_id;
use agenda_common::Caller;

use crate::orchestrator::{DisplayMessage, OrchestratorError};
use crate::Message;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default, alias = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(
        default,
        alias = "userId",
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            user_name: None,
            user_id: None,
        }
    }

    pub fn with_caller(mut self, caller: &Caller) -> Self {
        self.user_id = caller.user_id.clone();
        self.user_name = caller.user_name.clone();
        self
    }

    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Failure {
        error: String,
        messages_to_display: Vec<DisplayMessage>,
    },
    Display {
        messages_to_display: Vec<DisplayMessage>,
    },
}

impl ChatResponse {
    pub fn messages(&self) -> &[DisplayMessage] {
        match self {
            ChatResponse::Failure {
                messages_to_display,
                ..
            }
            | ChatResponse::Display {
                messages_to_display,
            } => messages_to_display,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub status: u16,
    pub body: ChatResponse,
}

impl ChatReply {
    pub fn display(messages: Vec<DisplayMessage>) -> Self {
        Self {
            status: 200,
            body: ChatResponse::Display {
                messages_to_display: messages,
            },
        }
    }

    /// One apology message; the error detail stays in the logs.
    pub fn failure(err: &OrchestratorError, apology: &str) -> Self {
        Self {
            status: err.status_code(),
            body: ChatResponse::Failure {
                error: err.summary().to_string(),
                messages_to_display: vec![DisplayMessage::error(apology)],
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
