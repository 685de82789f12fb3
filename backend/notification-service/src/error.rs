use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),
}
