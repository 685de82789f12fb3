/// Configuration management for processor-service
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use video_core::constants::{FFMPEG_TIMEOUT_SECS, MAX_CONCURRENT_TRANSCODING};

#[derive(Clone, Debug)]
pub struct Config {
    pub media: MediaConfig,
    pub kafka: KafkaConfig,
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub media_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub tool_timeout: Duration,
    pub max_concurrent_transcoding: usize,
}

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub brokers: String,
    pub group_id: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let tool_timeout_secs = match std::env::var("FFMPEG_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().context("invalid FFMPEG_TIMEOUT_SECS")?,
            Err(_) => FFMPEG_TIMEOUT_SECS,
        };
        let max_concurrent_transcoding = match std::env::var("MAX_CONCURRENT_TRANSCODING") {
            Ok(raw) => raw.parse().context("invalid MAX_CONCURRENT_TRANSCODING")?,
            Err(_) => MAX_CONCURRENT_TRANSCODING,
        };
        if max_concurrent_transcoding == 0 {
            anyhow::bail!("MAX_CONCURRENT_TRANSCODING must be at least 1");
        }

        Ok(Config {
            media: MediaConfig {
                media_root: PathBuf::from(
                    std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "uploads".to_string()),
                ),
                ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
                ffprobe_path: std::env::var("FFPROBE_PATH")
                    .unwrap_or_else(|_| "ffprobe".to_string()),
                tool_timeout: Duration::from_secs(tool_timeout_secs),
                max_concurrent_transcoding,
            },
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                group_id: std::env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "processor-service-group".to_string()),
            },
        })
    }
}
