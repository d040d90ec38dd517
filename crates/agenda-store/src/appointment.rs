//! Appointment record types and timestamp parsing.

use agenda_common::StoreError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Owner of the record; `None` for records created without a caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Appointment {
    /// Check a record that bypassed `create`, such as a seeded one.
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_fields(&self.title, self.start_time, self.end_time).map_err(|e| match e {
            StoreError::InvalidRecord(reason) => {
                StoreError::InvalidRecord(format!("appointment {}: {reason}", self.id))
            }
            other => other,
        })
    }
}

/// Fields required to create an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewAppointment {
    /// Reject records the store would refuse (empty title, non-positive span).
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_fields(&self.title, self.start_time, self.end_time)
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentChanges {
    pub title: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AppointmentChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }

    /// Apply the changes to a copy of `current`, validating the result.
    pub fn apply_to(&self, current: &Appointment) -> Result<Appointment, StoreError> {
        let mut updated = current.clone();
        if let Some(ref title) = self.title {
            updated.title = title.clone();
        }
        if let Some(start) = self.start_time {
            updated.start_time = start;
        }
        if let Some(end) = self.end_time {
            updated.end_time = end;
        }
        validate_fields(&updated.title, updated.start_time, updated.end_time)?;
        Ok(updated)
    }
}

fn validate_fields(
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::InvalidRecord("title must not be empty".into()));
    }
    if end <= start {
        return Err(StoreError::InvalidRecord(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

/// Parse a timestamp as RFC 3339, or as a naive `YYYY-MM-DDTHH:MM[:SS]`
/// value read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("'{raw}' is not a valid timestamp (expected RFC 3339)"))
}
