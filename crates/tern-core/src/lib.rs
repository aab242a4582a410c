pub mod error;
pub mod event;

pub use error::{EventBusError, Result, TernError};
