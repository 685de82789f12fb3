/// Error types for uploader-service
///
/// Validation failures are reported to HTTP clients as 400; everything else
/// surfaces as a 500 after the saga has published its failure event.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use event_bus::EventBusError;
use resilience::Elapsed;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage timeout: {0}")]
    Timeout(#[from] Elapsed),

    #[error("Invalid object name: {0}")]
    InvalidName(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Publish failed: {0}")]
    Publish(#[from] EventBusError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Validation(_) => StatusCode::BAD_REQUEST,
            UploadError::Storage(_) | UploadError::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            UploadError::Validation(_) => "validation_error",
            UploadError::Storage(_) => "storage_error",
            UploadError::Publish(_) => "server_error",
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error,
            message: self.to_string(),
        })
    }
}
