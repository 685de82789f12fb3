/// Catalog Service
///
/// Consumes upload and processing-result events and maintains the video catalog.
use catalog_service::{
    handler_registry, CatalogService, Config, InMemoryVideoRepository, PgVideoRepository,
    VideoRepository,
};
use event_bus::{spawn_dispatcher, KafkaConsumerConfig, KafkaEventPublisher, TopicDispatcher};
use sqlx::postgres::PgPoolOptions;
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
    tracing::info!("Starting catalog service");

    let repository: Arc<dyn VideoRepository> = match &config.database {
        Some(db) => {
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .connect(&db.url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Connected to database, migrations applied");
            Arc::new(PgVideoRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory video repository");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let publisher = Arc::new(KafkaEventPublisher::new(&config.kafka.brokers)?);
    let service = Arc::new(CatalogService::new(repository, publisher));
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

    tracing::info!("Catalog service shutting down");
    Ok(())
}
