/// Configuration management for notification-service
use anyhow::Context;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub kafka: KafkaConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub brokers: String,
    pub group_id: String,
}

#[derive(Clone, Copy, Debug)]
pub struct WebSocketConfig {
    /// Interval between server pings
    pub heartbeat_interval: Duration,
    /// A client silent for this long is disconnected
    pub client_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("NOTIFICATION_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("NOTIFICATION_PORT")
                    .unwrap_or_else(|_| "8085".to_string())
                    .parse()
                    .context("invalid NOTIFICATION_PORT")?,
            },
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                group_id: std::env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "notification-service-group".to_string()),
            },
            websocket: WebSocketConfig {
                heartbeat_interval: Duration::from_secs(
                    std::env::var("WS_HEARTBEAT_INTERVAL_SECS")
                        .unwrap_or_else(|_| "5".to_string())
                        .parse()
                        .context("invalid WS_HEARTBEAT_INTERVAL_SECS")?,
                ),
                client_timeout: Duration::from_secs(
                    std::env::var("WS_CLIENT_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "30".to_string())
                        .parse()
                        .context("invalid WS_CLIENT_TIMEOUT_SECS")?,
                ),
            },
        })
    }
}
