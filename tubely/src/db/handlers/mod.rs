//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection, provides strongly-typed operations and returns
//! models from [`crate::db::models`].
//!
//! - [`Videos`]: video records and their asset URLs

pub mod repository;
pub mod videos;

pub use repository::Repository;
pub use videos::Videos;
