//! API request/response models.

pub mod videos;
