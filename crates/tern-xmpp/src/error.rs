use thiserror::Error;

#[derive(Debug, Error)]
pub enum StanzaError {
    #[error("stanza parse failed: {0}")]
    ParseFailed(String),

    #[error("stanza serialization failed: {0}")]
    SerializeFailed(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("feature already registered: {0}")]
    DuplicateFeature(String),
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to start bridge runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("bridged operation panicked or was aborted")]
    Aborted,
}

#[derive(Debug, Error, Clone)]
pub enum SendError {
    #[error("transport rejected the stanza: {0}")]
    Rejected(String),

    #[error("transport is closed")]
    Closed,
}
