//! Topic names used by the media pipeline

pub const VIDEO_UPLOADED: &str = "video.uploaded.event";
pub const VIDEO_CATALOGED: &str = "video.cataloged.event";
pub const VIDEO_PROCESS_RESULT: &str = "video.process.result";
pub const VIDEO_NOTIFICATION: &str = "video.notification.event";
pub const VIDEO_UPLOAD_FAILED: &str = "video.upload.failed.event";
