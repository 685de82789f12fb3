//! Multi-resolution transcode fan-out.
//!
//! One task per ladder rung plus one duration read run on a bounded pool. The
//! join is all-or-nothing: the first failure ends the wait, and the remaining
//! tasks are detached to finish on their own. Outputs of tasks that completed
//! before a failure are left on disk.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;
use video_core::constants::RESOLUTION_LADDER;
use video_core::Rendition;

use crate::error::{ProcessorError, Result};
use crate::toolkit::MediaToolkit;

const MANIFEST_NAME: &str = "index.m3u8";

/// `45.0` -> `00:45`, `3661.0` -> `01:01:01`. Fractional seconds are truncated.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Where one rendition of a source ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenditionTarget {
    encoded: PathBuf,
    manifest: PathBuf,
    /// Manifest key relative to the media root
    manifest_ref: String,
}

/// `<dir>/<stem>_<label>/<stem>_<label>.mp4` and `<dir>/<stem>_<label>/index.m3u8`
fn rendition_target(media_root: &Path, source_ref: &str, label: &str) -> Result<RenditionTarget> {
    let (dir_ref, file_name) = match source_ref.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, source_ref),
    };
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    let output_name = format!("{}_{}", stem, label);
    let output_dir_ref = match dir_ref {
        Some(dir) => format!("{}/{}", dir, output_name),
        None => output_name.clone(),
    };
    let output_dir = resolve(media_root, &output_dir_ref)?;

    Ok(RenditionTarget {
        encoded: output_dir.join(format!("{}.mp4", output_name)),
        manifest: output_dir.join(MANIFEST_NAME),
        manifest_ref: format!("{}/{}", output_dir_ref, MANIFEST_NAME),
    })
}

/// Map a media key onto the media root; keys that would leave it are not found.
fn resolve(media_root: &Path, key: &str) -> Result<PathBuf> {
    let not_found = || ProcessorError::SourceNotFound(key.to_string());
    if key.starts_with('/') {
        return Err(not_found());
    }

    key.split('/')
        .filter(|part| !part.is_empty())
        .try_fold(media_root.to_path_buf(), |path, part| {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => Ok(path.join(part)),
                _ => Err(not_found()),
            }
        })
}

enum TaskOutput {
    Manifest { label: &'static str, manifest_ref: String },
    Duration(String),
}

pub struct TranscodeOrchestrator {
    toolkit: Arc<dyn MediaToolkit>,
    media_root: PathBuf,
    permits: Arc<Semaphore>,
    ladder: Vec<Rendition>,
}

impl TranscodeOrchestrator {
    pub fn new(toolkit: Arc<dyn MediaToolkit>, media_root: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            toolkit,
            media_root: media_root.into(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            ladder: RESOLUTION_LADDER.to_vec(),
        }
    }

    /// Replace the default resolution ladder.
    pub fn with_ladder(mut self, ladder: Vec<Rendition>) -> Self {
        self.ladder = ladder;
        self
    }

    /// Transcode every rung and read the duration.
    ///
    /// Returns resolution label -> manifest key, plus the formatted duration under
    /// `duration`.
    pub async fn process(&self, video_id: Uuid, source_ref: &str) -> Result<BTreeMap<String, String>> {
        let source = resolve(&self.media_root, source_ref)?;
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(ProcessorError::SourceNotFound(source.display().to_string()));
        }

        info!(video_id = %video_id, source = %source.display(), renditions = self.ladder.len(), "Transcoding started");

        let mut tasks: JoinSet<Result<TaskOutput>> = JoinSet::new();

        for rendition in self.ladder.iter().copied() {
            let toolkit = self.toolkit.clone();
            let permits = self.permits.clone();
            let source = source.clone();
            let target = rendition_target(&self.media_root, source_ref, rendition.label)?;

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ProcessorError::Worker(e.to_string()))?;

                if let Some(dir) = target.manifest.parent() {
                    tokio::fs::create_dir_all(dir).await?;
                }
                toolkit.transcode(&source, &target.encoded, &rendition).await?;
                toolkit.package_hls(&target.encoded, &target.manifest).await?;

                debug!(video_id = %video_id, label = rendition.label, "Rendition ready");
                Ok(TaskOutput::Manifest {
                    label: rendition.label,
                    manifest_ref: target.manifest_ref,
                })
            });
        }

        {
            let toolkit = self.toolkit.clone();
            let permits = self.permits.clone();
            let source = source.clone();
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ProcessorError::Worker(e.to_string()))?;
                let seconds = toolkit.read_duration(&source).await?;
                Ok(TaskOutput::Duration(format_duration(seconds)))
            });
        }

        let mut resolutions = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let output = match joined {
                Ok(Ok(output)) => output,
                Ok(Err(err)) => {
                    warn!(video_id = %video_id, remaining = tasks.len(), "Transcoding task failed: {}", err);
                    tasks.detach_all();
                    return Err(err);
                }
                Err(join_err) => {
                    tasks.detach_all();
                    return Err(ProcessorError::Worker(join_err.to_string()));
                }
            };

            match output {
                TaskOutput::Manifest { label, manifest_ref } => {
                    resolutions.insert(label.to_string(), manifest_ref);
                }
                TaskOutput::Duration(duration) => {
                    resolutions.insert(
                        event_schema::VideoProcessResult::DURATION_KEY.to_string(),
                        duration,
                    );
                }
            }
        }

        info!(video_id = %video_id, "Transcoding finished");
        Ok(resolutions)
    }
}
