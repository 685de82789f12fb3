//! Turns a cataloged video into exactly one processing-result event.

use event_bus::{publish_event, EventPublisher};
use event_schema::{ProcessStatus, VideoCataloged, VideoProcessResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::Result;
use crate::orchestrator::TranscodeOrchestrator;

pub const TRANSCODING_ERROR: &str = "TRANSCODING_ERROR";
pub const UNKNOWN_TRANSCODING_ERROR: &str = "Unknown error during transcoding.";

pub struct ProcessorService {
    orchestrator: TranscodeOrchestrator,
    publisher: Arc<dyn EventPublisher>,
}

impl ProcessorService {
    pub fn new(orchestrator: TranscodeOrchestrator, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            orchestrator,
            publisher,
        }
    }

    /// Run the transcode and publish its outcome. Only a failed publish is an error.
    pub async fn handle_cataloged(&self, event: VideoCataloged) -> Result<ProcessStatus> {
        let result = match self
            .orchestrator
            .process(event.video_id, &event.video_url)
            .await
        {
            Ok(resolutions) => {
                info!(video_id = %event.video_id, "Video processed");
                VideoProcessResult::success(event.video_id, resolutions)
            }
            Err(err) => {
                error!(video_id = %event.video_id, "Video processing failed: {}", err);
                let message = err.to_string();
                let message = if message.trim().is_empty() {
                    UNKNOWN_TRANSCODING_ERROR.to_string()
                } else {
                    message
                };
                VideoProcessResult::failure(event.video_id, TRANSCODING_ERROR, message)
            }
        };

        publish_event(self.publisher.as_ref(), &result).await?;
        Ok(result.status)
    }
}
