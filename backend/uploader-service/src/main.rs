/// Uploader Service - HTTP Server
///
/// Accepts multipart video submissions and runs the upload saga.
use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use event_bus::KafkaEventPublisher;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uploader_service::{handlers, Config, LocalBlobStorage, UploadSaga};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

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

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{:#}", e)))?;

    let publisher = KafkaEventPublisher::new(&config.kafka.brokers).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to create Kafka producer: {e}"),
        )
    })?;

    tokio::fs::create_dir_all(&config.storage.media_root).await?;
    let storage = LocalBlobStorage::new(config.storage.media_root.clone());

    let saga = web::Data::new(
        UploadSaga::new(
            Arc::new(storage),
            Arc::new(publisher),
            config.storage.timeout,
        )
        .with_partial_store_compensation(config.storage.compensate_partial_store),
    );

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(
        media_root = %config.storage.media_root.display(),
        compensate_partial_store = config.storage.compensate_partial_store,
        "Uploader service starting HTTP server on {}",
        bind_address
    );

    HttpServer::new(move || {
        App::new()
            .app_data(saga.clone())
            .wrap(actix_middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    tracing::info!("Uploader service shutting down");
    Ok(())
}
