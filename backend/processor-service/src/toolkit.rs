/// External media tools
///
/// ffmpeg transcodes and packages each rendition; ffprobe reads the source duration.
/// Every invocation is bounded by a timeout and the child is killed when it expires.
use async_trait::async_trait;
use resilience::with_timeout;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use video_core::constants::{AUDIO_BITRATE, HLS_SEGMENT_SECS, TRANSCODE_CRF};
use video_core::Rendition;

use crate::error::{ProcessorError, Result};

#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Scale and re-encode `input` into `output` (H.264 + AAC).
    async fn transcode(&self, input: &Path, output: &Path, rendition: &Rendition) -> Result<()>;

    /// Package an encoded file into an HLS playlist at `manifest`.
    async fn package_hls(&self, input: &Path, manifest: &Path) -> Result<()>;

    /// Source duration in seconds
    async fn read_duration(&self, input: &Path) -> Result<f64>;
}

pub fn transcode_args(input: &Path, output: &Path, rendition: &Rendition) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vf".into(),
        format!("scale={}", rendition.scale()),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "fast".into(),
        "-crf".into(),
        TRANSCODE_CRF.to_string(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        AUDIO_BITRATE.into(),
        output.to_string_lossy().into_owned(),
    ]
}

pub fn package_args(input: &Path, manifest: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        "copy".into(),
        "-hls_time".into(),
        HLS_SEGMENT_SECS.to_string(),
        "-hls_list_size".into(),
        "0".into(),
        "-f".into(),
        "hls".into(),
        manifest.to_string_lossy().into_owned(),
    ]
}

pub fn duration_args(input: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-show_entries".into(),
        "format=duration".into(),
        "-of".into(),
        "default=noprint_wrappers=1:nokey=1".into(),
        input.to_string_lossy().into_owned(),
    ]
}

/// Parse ffprobe's bare `format=duration` output, e.g. `125.340000`
pub fn parse_duration_output(stdout: &str) -> Result<f64> {
    let raw = stdout.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .ok_or_else(|| ProcessorError::Tool {
            tool: "ffprobe",
            message: format!("unexpected duration output: {:?}", raw),
        })
}

#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfmpegToolkit {
    pub fn new(
        ffmpeg_path: impl Into<PathBuf>,
        ffprobe_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    async fn run(&self, tool: &'static str, program: &Path, args: Vec<String>) -> Result<String> {
        debug!(tool = tool, args = ?args, "Running media tool");

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessorError::Tool {
                tool,
                message: format!("failed to spawn {}: {}", program.display(), e),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = with_timeout(tool, self.timeout, child.wait_with_output()).await??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(ProcessorError::Tool {
                tool,
                message: format!("exited with {}: {}", output.status, last_line.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn transcode(&self, input: &Path, output: &Path, rendition: &Rendition) -> Result<()> {
        self.run("ffmpeg", &self.ffmpeg_path, transcode_args(input, output, rendition))
            .await?;
        Ok(())
    }

    async fn package_hls(&self, input: &Path, manifest: &Path) -> Result<()> {
        self.run("ffmpeg", &self.ffmpeg_path, package_args(input, manifest))
            .await?;
        Ok(())
    }

    async fn read_duration(&self, input: &Path) -> Result<f64> {
        let stdout = self
            .run("ffprobe", &self.ffprobe_path, duration_args(input))
            .await?;
        parse_duration_output(&stdout)
    }
}
