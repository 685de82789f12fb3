//! Persistent store for catalog entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use video_core::{VideoRecord, VideoStatus};

use crate::error::{CatalogError, Result};

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>>;

    /// Insert or replace the record with the same `video_id`.
    async fn save(&self, record: &VideoRecord) -> Result<()>;
}

/// In-process store used by tests and local runs without PostgreSQL
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>> {
        Ok(self.videos.read().await.get(&video_id).cloned())
    }

    async fn save(&self, record: &VideoRecord) -> Result<()> {
        self.videos
            .write()
            .await
            .insert(record.video_id, record.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    video_id: Uuid,
    creator_id: Uuid,
    title: String,
    description: String,
    thumbnail_url: String,
    original_url: String,
    status: String,
    resolution_urls: Option<Json<BTreeMap<String, String>>>,
    duration: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for VideoRecord {
    type Error = CatalogError;

    fn try_from(row: VideoRow) -> Result<Self> {
        let status: VideoStatus = row.status.parse().map_err(|e| CatalogError::CorruptRecord {
            video_id: row.video_id,
            reason: format!("{}", e),
        })?;

        Ok(VideoRecord {
            video_id: row.video_id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            original_url: row.original_url,
            status,
            resolution_urls: row.resolution_urls.map(|Json(urls)| urls),
            duration: row.duration,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoRecord>> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT video_id, creator_id, title, description, thumbnail_url, original_url,
                   status, resolution_urls, duration, created_at
            FROM videos
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VideoRecord::try_from).transpose()
    }

    async fn save(&self, record: &VideoRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (video_id, creator_id, title, description, thumbnail_url,
                                original_url, status, resolution_urls, duration, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (video_id) DO UPDATE
            SET status = EXCLUDED.status,
                resolution_urls = EXCLUDED.resolution_urls,
                duration = EXCLUDED.duration
            "#,
        )
        .bind(record.video_id)
        .bind(record.creator_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.original_url)
        .bind(record.status.as_str())
        .bind(record.resolution_urls.as_ref().map(Json))
        .bind(&record.duration)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_save_overwrites() {
        let repo = InMemoryVideoRepository::new();
        let mut record =
            VideoRecord::pending(Uuid::new_v4(), Uuid::new_v4(), "t", "d", "img", "vid");

        repo.save(&record).await.unwrap();
        record.mark_failed().unwrap();
        repo.save(&record).await.unwrap();

        let stored = repo.get(record.video_id).await.unwrap().unwrap();
        assert_eq!(stored.status, VideoStatus::Failed);
        assert_eq!(repo.len().await, 1);
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
