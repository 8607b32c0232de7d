use crate::db::models::videos::VideoDBResponse;
use crate::types::{UserId, VideoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Video record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VideoId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    /// Public URL of the video's thumbnail, once one has been uploaded
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
}

impl From<VideoDBResponse> for VideoResponse {
    fn from(db: VideoDBResponse) -> Self {
        Self {
            id: db.id,
            created_at: db.created_at,
            updated_at: db.updated_at,
            title: db.title,
            description: db.description,
            thumbnail_url: db.thumbnail_url,
            video_url: db.video_url,
            user_id: db.user_id,
        }
    }
}
