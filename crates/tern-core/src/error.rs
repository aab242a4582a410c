use thiserror::Error;

/// The universal error type for the Tern client core.
#[derive(Error, Debug)]
pub enum TernError {
    #[error("XMPP error: {0}")]
    Xmpp(String),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for Tern operations.
pub type Result<T> = std::result::Result<T, TernError>;

#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Channel closed")]
    Closed,

    #[error("Subscriber lagged: {0} events missed")]
    Lagged(u64),
}
