/// Blob storage for uploaded media
///
/// Objects are addressed by keys relative to the media root, always with `/`
/// separators, e.g. `videos/<id>/original.mp4`.
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVideo {
    pub video_id: Uuid,
    pub object: StoredObject,
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn store_image(&self, file_name: &str, bytes: Bytes)
        -> Result<StoredObject, StorageError>;

    /// Store a new original video under a freshly generated video id.
    async fn store_video(&self, bytes: Bytes) -> Result<StoredVideo, StorageError>;

    /// Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed storage rooted at `MEDIA_ROOT`
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an object key. Keys may not leave the media root.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.starts_with('/') {
            return Err(StorageError::InvalidName(key.to_string()));
        }

        key.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self.root.clone(), |path, part| {
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => Ok(path.join(part)),
                    _ => Err(StorageError::InvalidName(key.to_string())),
                }
            })
    }

    async fn write(&self, key: String, bytes: Bytes) -> Result<StoredObject, StorageError> {
        let path = self.resolve(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!(key = %key, size = bytes.len(), "Object stored");
        Ok(StoredObject { key })
    }
}

/// Strip any directory components a client smuggled into the file name.
fn sanitize_file_name(file_name: &str) -> Result<String, StorageError> {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| StorageError::InvalidName(file_name.to_string()))
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn store_image(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let file_name = sanitize_file_name(file_name)?;
        let key = format!(
            "images/{}_{}",
            chrono::Utc::now().timestamp_millis(),
            file_name
        );
        self.write(key, bytes).await
    }

    async fn store_video(&self, bytes: Bytes) -> Result<StoredVideo, StorageError> {
        let video_id = Uuid::new_v4();
        let object = self
            .write(format!("videos/{}/original.mp4", video_id), bytes)
            .await?;
        Ok(StoredVideo { video_id, object })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Per-video directories are removed once empty; shared ones stay.
        if let Some(parent) = path.parent().filter(|dir| *dir != self.root.as_path()) {
            if parent.parent() != Some(self.root.as_path()) {
                if let Err(e) = tokio::fs::remove_dir(parent).await {
                    debug!(dir = %parent.display(), "Directory kept: {}", e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_video_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        let stored = storage.store_video(Bytes::from_static(b"mp4")).await.unwrap();

        assert_eq!(
            stored.object.key,
            format!("videos/{}/original.mp4", stored.video_id)
        );
        let on_disk = tokio::fs::read(storage.resolve(&stored.object.key).unwrap()).await.unwrap();
        assert_eq!(on_disk, b"mp4");
    }

    #[tokio::test]
    async fn test_store_image_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        let stored = storage
            .store_image("../../etc/thumb.png", Bytes::from_static(b"png"))
            .await
            .unwrap();

        assert!(stored.key.starts_with("images/"));
        assert!(stored.key.ends_with("_thumb.png"));
        assert!(storage.resolve(&stored.key).unwrap().starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_store_image_rejects_empty_name() {
        let storage = LocalBlobStorage::new("unused");
        let err = storage.store_image("", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        let stored = storage.store_video(Bytes::from_static(b"x")).await.unwrap();
        storage.delete(&stored.object.key).await.unwrap();
        storage.delete(&stored.object.key).await.unwrap();

        assert!(!storage.resolve(&stored.object.key).unwrap().exists());
    }

    #[tokio::test]
    async fn test_delete_removes_empty_video_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path());

        let stored = storage.store_video(Bytes::from_static(b"x")).await.unwrap();
        let image = storage
            .store_image("thumb.png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        storage.delete(&stored.object.key).await.unwrap();
        storage.delete(&image.key).await.unwrap();

        let video_dir = dir.path().join("videos").join(stored.video_id.to_string());
        assert!(!video_dir.exists());
        assert!(dir.path().join("videos").exists());
        assert!(dir.path().join("images").exists());
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_media_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStorage::new(dir.path().join("media"));

        for key in ["../outside.mp4", "videos/../../outside.mp4", "/etc/passwd", "videos/./x"] {
            assert!(
                matches!(storage.resolve(key), Err(StorageError::InvalidName(_))),
                "{}",
                key
            );
            assert!(storage.delete(key).await.is_err(), "{}", key);
        }
        assert!(storage.resolve("videos/abc/original.mp4").is_ok());
    }
}
