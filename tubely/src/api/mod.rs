//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - `POST /api/thumbnail_upload/{videoID}`: attach an uploaded image to a video
//! - `GET /api/videos/{videoID}`: read a video owned by the caller
//!
//! All endpoints are documented with `utoipa`; the rendered docs live at `/docs`.

pub mod handlers;
pub mod models;
