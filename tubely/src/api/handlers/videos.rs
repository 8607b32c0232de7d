use crate::api::models::videos::VideoResponse;
use crate::assets::{AssetId, ImageFormat};
use crate::auth;
use crate::db::handlers::{Repository, Videos};
use crate::db::models::videos::{VideoDBResponse, VideoUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{VideoId, abbrev_uuid, parse_video_id};
use crate::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::HeaderMap,
};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// Multipart field carrying the thumbnail image
const THUMBNAIL_FIELD: &str = "thumbnail";

/// The uploaded thumbnail part, buffered in memory
struct ThumbnailPart {
    content_type: Option<String>,
    content: Bytes,
}

fn form_error(e: impl std::fmt::Display) -> Error {
    tracing::debug!(error = %e, "Rejected multipart body");
    Error::BadRequest {
        message: "Failed to parse multipart form".to_string(),
    }
}

/// Find the first file part named `thumbnail` and read it fully.
///
/// Reading is bounded by the route's body limit; an image larger than `max_size` is rejected.
async fn read_thumbnail_part(multipart: &mut Multipart, max_size: u64) -> Result<ThumbnailPart> {
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) || field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let content = field.bytes().await.map_err(form_error)?;
        if content.len() as u64 > max_size {
            return Err(Error::BadRequest {
                message: format!("Thumbnail exceeds the {max_size} byte limit"),
            });
        }
        return Ok(ThumbnailPart { content_type, content });
    }

    Err(Error::BadRequest {
        message: "Failed to get thumbnail file from form".to_string(),
    })
}

/// Apply `update` and read the record back, so the response reflects what was stored.
async fn persist_update(db: &SqlitePool, video_id: VideoId, update: &VideoUpdateDBRequest) -> Result<VideoDBResponse> {
    let mut conn = db.acquire().await.map_err(|e| Error::Internal {
        operation: format!("update video data: {e}"),
    })?;
    let mut repo = Videos::new(&mut conn);

    repo.update(video_id, update).await.map_err(|e| Error::Internal {
        operation: format!("update video data: {e}"),
    })?;

    repo.get_by_id(video_id)
        .await
        .map_err(|e| Error::Internal {
            operation: format!("get updated video data: {e}"),
        })?
        .ok_or_else(|| Error::Internal {
            operation: format!("get updated video data: video {video_id} disappeared"),
        })
}

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{videoID}",
    tag = "videos",
    summary = "Upload thumbnail",
    description = "Store a JPEG or PNG image as the thumbnail of a video owned by the caller.",
    request_body(
        content_type = "multipart/form-data",
        description = "Form with a single `thumbnail` file part; its Content-Type must be image/jpeg or image/png"
    ),
    params(
        ("videoID" = String, Path, description = "The ID of the video")
    ),
    responses(
        (status = 200, description = "Thumbnail stored; the updated video", body = VideoResponse),
        (status = 400, description = "Invalid ID, malformed form or unsupported media type", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid token, or the caller does not own the video"),
        (status = 500, description = "Datastore or filesystem failure", body = crate::errors::ErrorResponse)
    ),
    security(("BearerAuth" = []))
)]
#[instrument(skip_all, fields(video_id = %video_id))]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = auth::authenticate(&headers, &state.config)?;

    info!(
        video_id = %video_id,
        user_id = %abbrev_uuid(&user_id),
        "Uploading thumbnail"
    );

    let mut multipart = multipart.map_err(form_error)?;
    let thumbnail = read_thumbnail_part(&mut multipart, state.config.uploads.max_thumbnail_size).await?;
    drop(multipart);

    let format = ImageFormat::parse_content_type(thumbnail.content_type.as_deref())?;

    let video = {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Internal {
            operation: format!("get video data: {e}"),
        })?;
        // Missing videos and storage errors are both reported as server errors
        match Videos::new(&mut conn).get_by_id(video_id).await {
            Ok(Some(video)) => video,
            Ok(None) => {
                return Err(Error::Internal {
                    operation: format!("get video data: video {video_id} not found"),
                });
            }
            Err(e) => {
                return Err(Error::Internal {
                    operation: format!("get video data: {e}"),
                });
            }
        }
    };

    if video.user_id != user_id {
        return Err(Error::NotOwner);
    }

    let file_name = AssetId::generate().file_name(format);
    state.assets.write(&file_name, &thumbnail.content).await?;

    let update = VideoUpdateDBRequest {
        thumbnail_url: Some(state.config.asset_url(&file_name)),
        ..Default::default()
    };

    let updated = match persist_update(&state.db, video_id, &update).await {
        Ok(video) => video,
        Err(e) => {
            state.assets.remove(&file_name).await;
            return Err(e);
        }
    };

    info!(
        video_id = %video_id,
        file_name = %file_name,
        bytes = thumbnail.content.len(),
        "Thumbnail stored"
    );

    Ok(Json(VideoResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{videoID}",
    tag = "videos",
    summary = "Retrieve video",
    description = "Returns a video owned by the caller.",
    params(
        ("videoID" = String, Path, description = "The ID of the video")
    ),
    responses(
        (status = 200, description = "Video record", body = VideoResponse),
        (status = 400, description = "Invalid ID", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid token, or the caller does not own the video"),
        (status = 404, description = "Video not found", body = crate::errors::ErrorResponse)
    ),
    security(("BearerAuth" = []))
)]
#[instrument(skip_all, fields(video_id = %video_id))]
pub async fn get_video(State(state): State<AppState>, Path(video_id): Path<String>, headers: HeaderMap) -> Result<Json<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = auth::authenticate(&headers, &state.config)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let video = Videos::new(&mut conn).get_by_id(video_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Video".to_string(),
        id: video_id.to_string(),
    })?;

    if video.user_id != user_id {
        return Err(Error::NotOwner);
    }

    Ok(Json(VideoResponse::from(video)))
}
