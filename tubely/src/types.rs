//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: Owner of a video, taken from the bearer token subject
//! - [`VideoId`]: Video record identifier

use crate::errors::Error;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type VideoId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Parse a video id taken from a request path.
pub fn parse_video_id(raw: &str) -> Result<VideoId, Error> {
    raw.parse::<VideoId>().map_err(|_| Error::InvalidIdentifier {
        message: "Invalid ID".to_string(),
    })
}
