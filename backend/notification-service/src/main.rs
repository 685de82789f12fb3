use actix_web::{middleware, web, App, HttpServer};
use event_bus::{spawn_dispatcher, KafkaConsumerConfig, TopicDispatcher};
use notification_service::{configure, handler_registry, Config, NotificationRouter, SessionRegistry};
use std::io;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    tracing::info!("Starting notification service");

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{:#}", e)))?;

    let router = Arc::new(NotificationRouter::new(SessionRegistry::new()));
    tracing::info!("Session registry initialized");

    let registry = handler_registry(router.clone())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = spawn_dispatcher(
        TopicDispatcher::new(registry),
        KafkaConsumerConfig::new(&config.kafka.brokers, &config.kafka.group_id),
        shutdown_rx,
    );

    let addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let router_data = web::Data::from(router.clone());
    let ws_settings = web::Data::new(config.websocket);

    HttpServer::new(move || {
        App::new()
            .app_data(router_data.clone())
            .app_data(ws_settings.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(&addr)?
    .run()
    .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = consumer.await {
        tracing::error!("Consumer task failed: {}", e);
    }
    router.shutdown();

    tracing::info!("Notification service shutting down");
    Ok(())
}
