//! Database repository for videos.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::videos::{VideoCreateDBRequest, VideoDBResponse, VideoUpdateDBRequest},
};
use crate::types::{VideoId, abbrev_uuid};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Videos<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Videos<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Videos<'c> {
    type CreateRequest = VideoCreateDBRequest;
    type UpdateRequest = VideoUpdateDBRequest;
    type Response = VideoDBResponse;
    type Id = VideoId;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();

        let video = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            INSERT INTO videos (id, created_at, updated_at, title, description, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(now)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(video)
    }

    #[instrument(skip(self), fields(video_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let video = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            SELECT id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id
            FROM videos
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(video)
    }

    /// Unconditional read-modify-write: concurrent updates to the same video race and the last
    /// write wins.
    #[instrument(skip(self, request), fields(video_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let video = sqlx::query_as::<_, VideoDBResponse>(
            r#"
            UPDATE videos SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                thumbnail_url = COALESCE(?, thumbnail_url),
                video_url = COALESCE(?, video_url),
                updated_at = ?
            WHERE id = ?
            RETURNING id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.thumbnail_url)
        .bind(&request.video_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        video.ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    fn create_request(user_id: Uuid) -> VideoCreateDBRequest {
        VideoCreateDBRequest {
            title: "Boot.dev intro".to_string(),
            description: "A short clip".to_string(),
            user_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_video() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Videos::new(&mut conn);

        let user_id = Uuid::new_v4();
        let created = repo.create(&create_request(user_id)).await.unwrap();
        assert_eq!(created.user_id, user_id);
        assert_eq!(created.title, "Boot.dev intro");
        assert!(created.thumbnail_url.is_none());
        assert!(created.video_url.is_none());

        let fetched = repo.get_by_id(created.id).await.unwrap().expect("video should exist");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_video_returns_none() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Videos::new(&mut conn);

        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_sets_thumbnail_and_keeps_other_fields() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Videos::new(&mut conn);

        let created = repo.create(&create_request(Uuid::new_v4())).await.unwrap();
        let update = VideoUpdateDBRequest {
            thumbnail_url: Some("http://localhost:8091/assets/abc.png".to_string()),
            ..Default::default()
        };

        let updated = repo.update(created.id, &update).await.unwrap();
        assert_eq!(updated.thumbnail_url.as_deref(), Some("http://localhost:8091/assets/abc.png"));
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_last_update_wins() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Videos::new(&mut conn);

        let created = repo.create(&create_request(Uuid::new_v4())).await.unwrap();
        for url in ["http://localhost/assets/first.jpg", "http://localhost/assets/second.jpg"] {
            let update = VideoUpdateDBRequest {
                thumbnail_url: Some(url.to_string()),
                ..Default::default()
            };
            repo.update(created.id, &update).await.unwrap();
        }

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.thumbnail_url.as_deref(), Some("http://localhost/assets/second.jpg"));
    }

    #[tokio::test]
    async fn test_update_missing_video_is_not_found() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Videos::new(&mut conn);

        let result = repo.update(Uuid::new_v4(), &VideoUpdateDBRequest::default()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }
}
