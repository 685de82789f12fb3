//! Error types for the event bus library.

use thiserror::Error;

/// Result type alias for bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Errors that can occur while publishing or consuming events.
#[derive(Error, Debug)]
pub enum EventBusError {
    /// Broker unreachable, delivery timed out, or commit rejected
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A second handler was registered for an already-routed topic
    #[error("Handler already registered for topic: {0}")]
    DuplicateHandler(String),
}

impl From<rdkafka::error::KafkaError> for EventBusError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        EventBusError::Transport(err.to_string())
    }
}
