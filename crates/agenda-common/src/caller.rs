//! Opaque caller identity forwarded from the authentication layer.

use serde::{Deserialize, Deserializer, Serialize};

/// Who a request is being made for.
///
/// The core never validates this; it only forwards it to tools so store
/// operations can be scoped to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_name: Some(user_name.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Name to address the user by, if the session supplied one.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("the user")
    }
}

/// Accept user ids sent either as JSON strings or numbers.
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "user id must be a string or number, got {other}"
        ))),
    }
}
