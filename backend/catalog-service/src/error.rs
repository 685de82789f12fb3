use event_bus::EventBusError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Video not found: {0}")]
    VideoNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt video record {video_id}: {reason}")]
    CorruptRecord { video_id: Uuid, reason: String },

    #[error("Publish failed: {0}")]
    Publish(#[from] EventBusError),
}
