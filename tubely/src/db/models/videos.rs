//! Database models for videos.

use crate::types::{UserId, VideoId};
use chrono::{DateTime, Utc};

/// Database request for creating a new video
#[derive(Debug, Clone)]
pub struct VideoCreateDBRequest {
    pub title: String,
    pub description: String,
    pub user_id: UserId,
}

/// Database request for updating a video
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct VideoUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

/// Database response for a video
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VideoDBResponse {
    pub id: VideoId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub user_id: UserId,
}
