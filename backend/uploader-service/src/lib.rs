/// Uploader Service Library
///
/// Accepts new-video submissions, stores the media, and starts the processing
/// pipeline by publishing `video.uploaded.event`.
pub mod config;
pub mod error;
pub mod handlers;
pub mod saga;
pub mod storage;

pub use config::Config;
pub use error::{Result, StorageError, UploadError};
pub use saga::{UploadAccepted, UploadRequest, UploadSaga};
pub use storage::{BlobStorage, LocalBlobStorage, StoredObject, StoredVideo};
