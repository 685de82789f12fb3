//! Video pipeline constants

use crate::models::Rendition;

/// Maximum video file size (500 MB)
pub const MAX_VIDEO_SIZE: usize = 500 * 1024 * 1024;

/// Maximum thumbnail image size (10 MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum video title length
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum video description length
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Transcoding ladder, highest first
pub const RESOLUTION_LADDER: &[Rendition] = &[
    Rendition { label: "1080p", width: 1920, height: 1080 },
    Rendition { label: "720p", width: 1280, height: 720 },
    Rendition { label: "360p", width: 640, height: 360 },
];

/// HLS segment length in seconds
pub const HLS_SEGMENT_SECS: u32 = 8;

/// x264 constant rate factor
pub const TRANSCODE_CRF: u32 = 23;

/// AAC audio bitrate
pub const AUDIO_BITRATE: &str = "128k";

/// FFmpeg timeout (60 minutes)
pub const FFMPEG_TIMEOUT_SECS: u64 = 60 * 60;

/// Maximum concurrent ffmpeg invocations per processor
pub const MAX_CONCURRENT_TRANSCODING: usize = 4;
