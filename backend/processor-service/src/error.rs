use event_bus::EventBusError;
use resilience::Elapsed;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessorError>;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Video file not found: {0}")]
    SourceNotFound(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },

    #[error(transparent)]
    Timeout(#[from] Elapsed),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("Publish failed: {0}")]
    Publish(#[from] EventBusError),
}
