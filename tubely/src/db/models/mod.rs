//! Database record structures.
//!
//! - `*CreateDBRequest`: input for creating a record
//! - `*UpdateDBRequest`: input for changing a record
//! - `*DBResponse`: a record as read back from the database

pub mod videos;
