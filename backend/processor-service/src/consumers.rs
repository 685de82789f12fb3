use async_trait::async_trait;
use event_bus::{EventBusResult, EventHandler, HandlerRegistry};
use event_schema::{topics, VideoCataloged};
use std::sync::Arc;

use crate::service::ProcessorService;

pub struct VideoCatalogedHandler {
    service: Arc<ProcessorService>,
}

#[async_trait]
impl EventHandler for VideoCatalogedHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let event: VideoCataloged = serde_json::from_slice(payload)?;
        self.service.handle_cataloged(event).await?;
        Ok(())
    }
}

pub fn handler_registry(service: Arc<ProcessorService>) -> EventBusResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register(
        topics::VIDEO_CATALOGED,
        Arc::new(VideoCatalogedHandler { service }),
    )?;
    Ok(registry)
}
