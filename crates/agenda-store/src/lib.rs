//! Appointment storage for the agenda assistant.
//!
//! Defines the appointment record, the async `AppointmentStore` contract the
//! assistant's tools call into, and an in-memory implementation.

pub mod appointment;
pub mod memory;
pub mod store;

pub use appointment::{parse_timestamp, Appointment, AppointmentChanges, NewAppointment};
pub use memory::{MemoryStore, DEFAULT_POOL_SIZE};
pub use store::AppointmentStore;
