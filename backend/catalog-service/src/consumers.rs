//! Event handlers wired into the topic dispatcher.

use async_trait::async_trait;
use event_bus::{EventBusResult, EventHandler, HandlerRegistry};
use event_schema::{topics, VideoProcessResult, VideoUploaded};
use std::sync::Arc;

use crate::service::CatalogService;

pub struct VideoUploadedHandler {
    service: Arc<CatalogService>,
}

#[async_trait]
impl EventHandler for VideoUploadedHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let event: VideoUploaded = serde_json::from_slice(payload)?;
        self.service.register_video(event).await?;
        Ok(())
    }
}

pub struct VideoProcessResultHandler {
    service: Arc<CatalogService>,
}

#[async_trait]
impl EventHandler for VideoProcessResultHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let event: VideoProcessResult = serde_json::from_slice(payload)?;
        self.service.apply_process_result(event).await?;
        Ok(())
    }
}

/// Topic table for the catalog consumer
pub fn handler_registry(service: Arc<CatalogService>) -> EventBusResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register(
        topics::VIDEO_UPLOADED,
        Arc::new(VideoUploadedHandler {
            service: service.clone(),
        }),
    )?;
    registry.register(
        topics::VIDEO_PROCESS_RESULT,
        Arc::new(VideoProcessResultHandler { service }),
    )?;
    Ok(registry)
}
