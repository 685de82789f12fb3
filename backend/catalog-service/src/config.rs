/// Configuration management for catalog-service
use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    pub kafka: KafkaConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub brokers: String,
    pub group_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Without `DATABASE_URL` the catalog runs on the in-memory store.
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("invalid DATABASE_MAX_CONNECTIONS")?,
            }),
            _ => None,
        };

        Ok(Config {
            database,
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                group_id: std::env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "catalog-service-group".to_string()),
            },
        })
    }
}
