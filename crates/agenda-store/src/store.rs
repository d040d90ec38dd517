//! The store contract the assistant's tools are written against.

use agenda_common::StoreError;
use async_trait::async_trait;

use crate::appointment::{Appointment, AppointmentChanges, NewAppointment};

/// Appointment persistence.
///
/// Every method is one atomic operation. `owner` scopes the operation to a
/// user; records belonging to someone else behave as if they did not exist.
/// A `None` owner only reaches records that have no owner.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(
        &self,
        owner: Option<&str>,
        appointment: NewAppointment,
    ) -> Result<Appointment, StoreError>;

    /// All appointments visible to `owner`, ordered by start time.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Appointment>, StoreError>;

    async fn get(&self, owner: Option<&str>, id: i64) -> Result<Appointment, StoreError>;

    async fn update(
        &self,
        owner: Option<&str>,
        id: i64,
        changes: AppointmentChanges,
    ) -> Result<Appointment, StoreError>;

    /// Remove a record and return what was deleted.
    async fn delete(&self, owner: Option<&str>, id: i64) -> Result<Appointment, StoreError>;
}
