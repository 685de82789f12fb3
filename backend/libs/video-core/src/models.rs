//! Core video data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Video lifecycle status.
///
/// `Pending` is the only initial state; `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Pending,
    Ready,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "PENDING",
            VideoStatus::Ready => "READY",
            VideoStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Ready | VideoStatus::Failed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(VideoStatus::Pending),
            "READY" => Ok(VideoStatus::Ready),
            "FAILED" => Ok(VideoStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown video status: {0}")]
pub struct UnknownStatus(pub String);

/// Rejected lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("video {video_id} is already {status}")]
    AlreadyTerminal { video_id: Uuid, status: VideoStatus },
}

/// One rung of the resolution ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rendition {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Rendition {
    /// Value for ffmpeg's `scale` filter, e.g. `1280:720`
    pub fn scale(&self) -> String {
        format!("{}:{}", self.width, self.height)
    }
}

/// Catalog entry for one uploaded video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub original_url: String,
    pub status: VideoStatus,
    /// Resolution label -> manifest reference, only set once `Ready`
    pub resolution_urls: Option<BTreeMap<String, String>>,
    /// `MM:SS` or `HH:MM:SS`, only set once `Ready`
    pub duration: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn pending(
        video_id: Uuid,
        creator_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        thumbnail_url: impl Into<String>,
        original_url: impl Into<String>,
    ) -> Self {
        Self {
            video_id,
            creator_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: thumbnail_url.into(),
            original_url: original_url.into(),
            status: VideoStatus::Pending,
            resolution_urls: None,
            duration: None,
            created_at: Utc::now(),
        }
    }

    /// PENDING -> READY
    pub fn mark_ready(
        &mut self,
        resolution_urls: BTreeMap<String, String>,
        duration: Option<String>,
    ) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        self.status = VideoStatus::Ready;
        self.resolution_urls = Some(resolution_urls);
        self.duration = duration;
        Ok(())
    }

    /// PENDING -> FAILED
    pub fn mark_failed(&mut self) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        self.status = VideoStatus::Failed;
        self.resolution_urls = None;
        self.duration = None;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                video_id: self.video_id,
                status: self.status,
            });
        }
        Ok(())
    }
}
