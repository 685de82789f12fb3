/// Configuration management for uploader-service
///
/// Loads configuration from environment variables with sensible defaults.
use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub kafka: KafkaConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub brokers: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub media_root: PathBuf,
    pub timeout: Duration,
    /// Delete the surviving object when its sibling store failed
    pub compensate_partial_store: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            app: AppConfig {
                host: env_or("UPLOADER_HOST", "0.0.0.0".to_string())?,
                port: env_or("UPLOADER_PORT", 8081)?,
            },
            kafka: KafkaConfig {
                brokers: env_or("KAFKA_BROKERS", "localhost:9092".to_string())?,
            },
            storage: StorageConfig {
                media_root: PathBuf::from(env_or("MEDIA_ROOT", "uploads".to_string())?),
                timeout: Duration::from_secs(env_or("STORAGE_TIMEOUT_SECS", 120)?),
                compensate_partial_store: env_or("UPLOAD_COMPENSATE_PARTIAL_STORE", false)?,
            },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}", key)),
        _ => Ok(default),
    }
}
