/// Event schemas for the video media pipeline
///
/// Every payload travelling on the bus is defined here so that the uploader, catalog,
/// processor and notification services agree on one JSON shape. Payloads are flat
/// camelCase objects; the Kafka key carries the correlation id.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod topics;

/// A payload bound to exactly one topic.
///
/// `correlation_key` is used as the Kafka record key, so all events for one video
/// (or, for upload failures, one creator) land on the same partition.
pub trait TopicEvent: Serialize {
    const TOPIC: &'static str;

    fn correlation_key(&self) -> String;
}

/// Outcome reported by the processor for one transcoding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    Success,
    Failure,
}

/// Status shown to the creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Success,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Success => "SUCCESS",
            NotificationStatus::Failed => "FAILED",
        }
    }
}

// ============================================================================
// UPLOADER SERVICE EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUploaded {
    pub video_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub original_url: String,
}

impl TopicEvent for VideoUploaded {
    const TOPIC: &'static str = topics::VIDEO_UPLOADED;

    fn correlation_key(&self) -> String {
        self.video_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUploadFailed {
    pub creator_id: Uuid,
    pub status: NotificationStatus,
    pub message: String,
}

impl VideoUploadFailed {
    pub const DEFAULT_MESSAGE: &'static str =
        "An error occurred while uploading your video. Please try again later.";

    pub fn new(creator_id: Uuid) -> Self {
        Self {
            creator_id,
            status: NotificationStatus::Failed,
            message: Self::DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl TopicEvent for VideoUploadFailed {
    const TOPIC: &'static str = topics::VIDEO_UPLOAD_FAILED;

    fn correlation_key(&self) -> String {
        self.creator_id.to_string()
    }
}

// ============================================================================
// CATALOG SERVICE EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCataloged {
    pub video_id: Uuid,
    /// Storage reference of the original upload, relative to the media root
    pub video_url: String,
}

impl TopicEvent for VideoCataloged {
    const TOPIC: &'static str = topics::VIDEO_CATALOGED;

    fn correlation_key(&self) -> String {
        self.video_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoNotification {
    pub creator_id: Uuid,
    pub video_id: Uuid,
    pub status: NotificationStatus,
    pub message: String,
}

impl TopicEvent for VideoNotification {
    const TOPIC: &'static str = topics::VIDEO_NOTIFICATION;

    fn correlation_key(&self) -> String {
        self.video_id.to_string()
    }
}

// ============================================================================
// PROCESSOR SERVICE EVENTS
// ============================================================================

/// Result of transcoding one video.
///
/// On success `resolutions` maps each resolution label to its manifest reference and
/// also carries the formatted duration under [`VideoProcessResult::DURATION_KEY`].
/// On failure only `error_code`/`error_message` are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProcessResult {
    pub video_id: Uuid,
    pub status: ProcessStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VideoProcessResult {
    /// Reserved key in `resolutions` holding the `MM:SS`/`HH:MM:SS` duration
    pub const DURATION_KEY: &'static str = "duration";

    pub fn success(video_id: Uuid, resolutions: BTreeMap<String, String>) -> Self {
        Self {
            video_id,
            status: ProcessStatus::Success,
            resolutions: Some(resolutions),
            error_code: None,
            error_message: None,
        }
    }

    pub fn failure(
        video_id: Uuid,
        error_code: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            video_id,
            status: ProcessStatus::Failure,
            resolutions: None,
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
        }
    }
}

impl TopicEvent for VideoProcessResult {
    const TOPIC: &'static str = topics::VIDEO_PROCESS_RESULT;

    fn correlation_key(&self) -> String {
        self.video_id.to_string()
    }
}
