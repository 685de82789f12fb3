/// Processor Service Library
///
/// Transcodes cataloged videos into an HLS resolution ladder with ffmpeg and
/// reports the outcome on `video.process.result`.
pub mod config;
pub mod consumers;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod toolkit;

pub use config::Config;
pub use consumers::handler_registry;
pub use error::{ProcessorError, Result};
pub use orchestrator::{format_duration, TranscodeOrchestrator};
pub use service::{ProcessorService, TRANSCODING_ERROR};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
