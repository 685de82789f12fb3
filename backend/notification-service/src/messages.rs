/// Messages pushed to connected creators
use event_schema::{NotificationStatus, VideoNotification, VideoUploadFailed};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushMessage {
    /// Processing finished, successfully or not
    #[serde(rename_all = "camelCase")]
    VideoStatus {
        video_id: Uuid,
        creator_id: Uuid,
        status: NotificationStatus,
        message: String,
    },

    /// The upload itself never made it into the pipeline
    #[serde(rename_all = "camelCase")]
    UploadFailed {
        creator_id: Uuid,
        status: NotificationStatus,
        message: String,
    },
}

impl PushMessage {
    pub fn creator_id(&self) -> Uuid {
        match self {
            PushMessage::VideoStatus { creator_id, .. } => *creator_id,
            PushMessage::UploadFailed { creator_id, .. } => *creator_id,
        }
    }
}

impl From<VideoNotification> for PushMessage {
    fn from(event: VideoNotification) -> Self {
        PushMessage::VideoStatus {
            video_id: event.video_id,
            creator_id: event.creator_id,
            status: event.status,
            message: event.message,
        }
    }
}

impl From<VideoUploadFailed> for PushMessage {
    fn from(event: VideoUploadFailed) -> Self {
        PushMessage::UploadFailed {
            creator_id: event.creator_id,
            status: event.status,
            message: event.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_status_wire_shape() {
        let video_id = Uuid::new_v4();
        let creator_id = Uuid::new_v4();
        let message = PushMessage::from(VideoNotification {
            creator_id,
            video_id,
            status: NotificationStatus::Success,
            message: "Your video is ready!".into(),
        });

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "VIDEO_STATUS");
        assert_eq!(json["videoId"], video_id.to_string());
        assert_eq!(json["creatorId"], creator_id.to_string());
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["message"], "Your video is ready!");
    }

    #[test]
    fn test_upload_failed_wire_shape() {
        let creator_id = Uuid::new_v4();
        let message = PushMessage::from(VideoUploadFailed::new(creator_id));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "UPLOAD_FAILED");
        assert_eq!(json["status"], "FAILED");
        assert!(json.get("videoId").is_none());
        assert_eq!(message.creator_id(), creator_id);
    }
}
