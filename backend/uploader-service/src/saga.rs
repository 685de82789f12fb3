//! Upload saga: store both media objects, then announce the upload.
//!
//! Exactly one of `VideoUploaded` / `VideoUploadFailed` is published per
//! submission. Stored objects are deleted again when the announcement cannot be
//! published; a failed store leaves its sibling in place unless partial-store
//! compensation is enabled.

use bytes::Bytes;
use event_bus::{publish_event, EventPublisher};
use event_schema::{VideoUploadFailed, VideoUploaded};
use resilience::with_timeout_result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;
use video_core::constants::{
    MAX_DESCRIPTION_LENGTH, MAX_IMAGE_SIZE, MAX_TITLE_LENGTH, MAX_VIDEO_SIZE,
};

use crate::error::{Result, StorageError, UploadError};
use crate::storage::{BlobStorage, StoredObject, StoredVideo};

/// A creator's new-video submission
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_name: String,
    pub image: Bytes,
    pub video: Bytes,
}

impl UploadRequest {
    /// Boundary checks, run before any storage work.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(UploadError::Validation("title is required".into()));
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(UploadError::Validation(format!(
                "title exceeds {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(UploadError::Validation(format!(
                "description exceeds {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        if self.image.is_empty() {
            return Err(UploadError::Validation("image is required".into()));
        }
        if self.video.is_empty() {
            return Err(UploadError::Validation("video is required".into()));
        }
        if self.image.len() > MAX_IMAGE_SIZE {
            return Err(UploadError::Validation("image is too large".into()));
        }
        if self.video.len() > MAX_VIDEO_SIZE {
            return Err(UploadError::Validation("video is too large".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadAccepted {
    pub video_id: Uuid,
}

pub struct UploadSaga {
    storage: Arc<dyn BlobStorage>,
    publisher: Arc<dyn EventPublisher>,
    store_timeout: Duration,
    compensate_partial_store: bool,
}

impl UploadSaga {
    pub fn new(
        storage: Arc<dyn BlobStorage>,
        publisher: Arc<dyn EventPublisher>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            publisher,
            store_timeout,
            compensate_partial_store: false,
        }
    }

    /// Also delete the surviving object when one of the two stores fails.
    pub fn with_partial_store_compensation(mut self, enabled: bool) -> Self {
        self.compensate_partial_store = enabled;
        self
    }

    pub async fn submit(&self, request: UploadRequest) -> Result<UploadAccepted> {
        let creator_id = request.creator_id;

        match self.run(request).await {
            Ok(accepted) => Ok(accepted),
            Err(err) => {
                error!(creator_id = %creator_id, "Upload failed: {}", err);
                self.report_failure(creator_id).await;
                Err(err)
            }
        }
    }

    async fn run(&self, request: UploadRequest) -> Result<UploadAccepted> {
        let (image, video) = tokio::join!(
            self.store_image(&request.image_name, request.image),
            self.store_video(request.video),
        );

        let (image, video) = match (image, video) {
            (Ok(image), Ok(video)) => (image, video),
            (Err(err), video) => {
                self.discard_survivor(video.ok().map(|v| v.object.key)).await;
                return Err(err.into());
            }
            (Ok(image), Err(err)) => {
                self.discard_survivor(Some(image.key)).await;
                return Err(err.into());
            }
        };

        let event = VideoUploaded {
            video_id: video.video_id,
            creator_id: request.creator_id,
            title: request.title,
            description: request.description,
            thumbnail_url: image.key.clone(),
            original_url: video.object.key.clone(),
        };

        if let Err(err) = publish_event(self.publisher.as_ref(), &event).await {
            warn!(
                video_id = %video.video_id,
                "Failed to publish upload event, deleting stored objects"
            );
            tokio::join!(self.discard(&image.key), self.discard(&video.object.key));
            return Err(err.into());
        }

        info!(
            video_id = %video.video_id,
            creator_id = %event.creator_id,
            "Video uploaded"
        );
        Ok(UploadAccepted {
            video_id: video.video_id,
        })
    }

    async fn store_image(&self, name: &str, bytes: Bytes) -> std::result::Result<StoredObject, StorageError> {
        with_timeout_result(
            "store image",
            self.store_timeout,
            self.storage.store_image(name, bytes),
        )
        .await
        .map_err(|e| e.into_inner_with(StorageError::Timeout))
    }

    async fn store_video(&self, bytes: Bytes) -> std::result::Result<StoredVideo, StorageError> {
        with_timeout_result("store video", self.store_timeout, self.storage.store_video(bytes))
            .await
            .map_err(|e| e.into_inner_with(StorageError::Timeout))
    }

    async fn discard_survivor(&self, key: Option<String>) {
        if !self.compensate_partial_store {
            return;
        }
        if let Some(key) = key {
            self.discard(&key).await;
        }
    }

    /// Best-effort delete; failures are only logged.
    async fn discard(&self, key: &str) {
        let result = with_timeout_result("delete object", self.store_timeout, self.storage.delete(key))
            .await
            .map_err(|e| e.into_inner_with(StorageError::Timeout));

        match result {
            Ok(()) => info!(key = key, "Compensated stored object"),
            Err(err) => warn!(key = key, "Failed to delete stored object: {}", err),
        }
    }

    async fn report_failure(&self, creator_id: Uuid) {
        let event = VideoUploadFailed::new(creator_id);
        if let Err(err) = publish_event(self.publisher.as_ref(), &event).await {
            error!(
                creator_id = %creator_id,
                "Failed to publish upload failure event: {}", err
            );
        }
    }
}
