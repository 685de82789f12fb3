//! Catalog state machine.
//!
//! PENDING is created on upload; a processing result moves it to READY or
//! FAILED exactly once, and every such transition is announced to the creator.

use event_bus::{publish_event, EventPublisher};
use event_schema::{
    NotificationStatus, ProcessStatus, VideoCataloged, VideoNotification, VideoProcessResult,
    VideoUploaded,
};
use std::sync::Arc;
use tracing::{info, warn};
use video_core::{VideoRecord, VideoStatus};

use crate::error::{CatalogError, Result};
use crate::repository::VideoRepository;

pub const READY_MESSAGE: &str = "Your video is ready!";
pub const FAILED_MESSAGE_PREFIX: &str = "Your video could not be uploaded: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    /// A record with this id already exists; nothing was written or published
    AlreadyRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOutcome {
    Ready,
    Failed,
    /// The record was already terminal; the result was ignored
    Skipped(VideoStatus),
}

pub struct CatalogService {
    repository: Arc<dyn VideoRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn VideoRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Create the PENDING record and hand the original off for processing.
    pub async fn register_video(&self, event: VideoUploaded) -> Result<RegisterOutcome> {
        if let Some(existing) = self.repository.get(event.video_id).await? {
            warn!(
                video_id = %event.video_id,
                status = %existing.status,
                "Duplicate upload event ignored"
            );
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let record = VideoRecord::pending(
            event.video_id,
            event.creator_id,
            event.title,
            event.description,
            event.thumbnail_url,
            event.original_url,
        );
        self.repository.save(&record).await?;

        publish_event(
            self.publisher.as_ref(),
            &VideoCataloged {
                video_id: record.video_id,
                video_url: record.original_url.clone(),
            },
        )
        .await?;

        info!(video_id = %record.video_id, creator_id = %record.creator_id, "Video cataloged");
        Ok(RegisterOutcome::Registered)
    }

    pub async fn apply_process_result(&self, event: VideoProcessResult) -> Result<ResultOutcome> {
        let mut record = self
            .repository
            .get(event.video_id)
            .await?
            .ok_or(CatalogError::VideoNotFound(event.video_id))?;

        let (transition, outcome, status, message) = match event.status {
            ProcessStatus::Success => {
                let mut resolutions = event.resolutions.unwrap_or_default();
                let duration = resolutions.remove(VideoProcessResult::DURATION_KEY);
                (
                    record.mark_ready(resolutions, duration),
                    ResultOutcome::Ready,
                    NotificationStatus::Success,
                    READY_MESSAGE.to_string(),
                )
            }
            ProcessStatus::Failure => {
                warn!(
                    video_id = %event.video_id,
                    error_code = event.error_code.as_deref().unwrap_or("UNKNOWN"),
                    "Video processing failed"
                );
                (
                    record.mark_failed(),
                    ResultOutcome::Failed,
                    NotificationStatus::Failed,
                    format!(
                        "{}{}",
                        FAILED_MESSAGE_PREFIX,
                        event.error_message.as_deref().unwrap_or("unknown error")
                    ),
                )
            }
        };

        if let Err(err) = transition {
            warn!(video_id = %record.video_id, "Process result skipped: {}", err);
            return Ok(ResultOutcome::Skipped(record.status));
        }

        self.repository.save(&record).await?;

        publish_event(
            self.publisher.as_ref(),
            &VideoNotification {
                creator_id: record.creator_id,
                video_id: record.video_id,
                status,
                message,
            },
        )
        .await?;

        info!(video_id = %record.video_id, status = %record.status, "Video status updated");
        Ok(outcome)
    }
}
