pub mod caller;
pub mod errors;
pub mod id;

pub use caller::Caller;
pub use errors::{AgendaError, ConfigError, StoreError};
pub use id::{new_correlation_id, new_id};

pub type Result<T> = std::result::Result<T, AgendaError>;
