//! Bus handlers forwarding creator-facing events to live connections.

use async_trait::async_trait;
use event_bus::{EventBusResult, EventHandler, HandlerRegistry};
use event_schema::{topics, VideoNotification, VideoUploadFailed};
use std::sync::Arc;
use tracing::debug;

use crate::messages::PushMessage;
use crate::router::NotificationRouter;

pub struct VideoNotificationHandler {
    router: Arc<NotificationRouter>,
}

#[async_trait]
impl EventHandler for VideoNotificationHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let event: VideoNotification = serde_json::from_slice(payload)?;
        let push = PushMessage::from(event);
        let creator_id = push.creator_id();
        let outcome = self.router.deliver(creator_id, &push);
        debug!(creator_id = %creator_id, ?outcome, "Video notification routed");
        Ok(())
    }
}

pub struct UploadFailedHandler {
    router: Arc<NotificationRouter>,
}

#[async_trait]
impl EventHandler for UploadFailedHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let event: VideoUploadFailed = serde_json::from_slice(payload)?;
        let push = PushMessage::from(event);
        let creator_id = push.creator_id();
        let outcome = self.router.deliver(creator_id, &push);
        debug!(creator_id = %creator_id, ?outcome, "Upload failure routed");
        Ok(())
    }
}

pub fn handler_registry(router: Arc<NotificationRouter>) -> EventBusResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register(
        topics::VIDEO_NOTIFICATION,
        Arc::new(VideoNotificationHandler {
            router: router.clone(),
        }),
    )?;
    registry.register(
        topics::VIDEO_UPLOAD_FAILED,
        Arc::new(UploadFailedHandler { router }),
    )?;
    Ok(registry)
}
