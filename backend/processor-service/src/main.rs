/// Processor Service
///
/// Consumes `video.cataloged.event`, transcodes, and publishes the result.
use event_bus::{spawn_dispatcher, KafkaConsumerConfig, KafkaEventPublisher, TopicDispatcher};
use processor_service::{
    handler_registry, Config, FfmpegToolkit, ProcessorService, TranscodeOrchestrator,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        media_root = %config.media.media_root.display(),
        max_concurrent = config.media.max_concurrent_transcoding,
        "Starting processor service"
    );

    let toolkit = FfmpegToolkit::new(
        &config.media.ffmpeg_path,
        &config.media.ffprobe_path,
        config.media.tool_timeout,
    );
    let orchestrator = TranscodeOrchestrator::new(
        Arc::new(toolkit),
        config.media.media_root.clone(),
        config.media.max_concurrent_transcoding,
    );

    let publisher = Arc::new(KafkaEventPublisher::new(&config.kafka.brokers)?);
    let service = Arc::new(ProcessorService::new(orchestrator, publisher));
    let dispatcher = TopicDispatcher::new(handler_registry(service)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = spawn_dispatcher(
        dispatcher,
        KafkaConsumerConfig::new(&config.kafka.brokers, &config.kafka.group_id),
        shutdown_rx,
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    if let Err(e) = consumer.await {
        tracing::error!("Consumer task failed: {}", e);
    }

    tracing::info!("Processor service shutting down");
    Ok(())
}
