//! HTTP request handlers.
//!
//! Handlers validate the request, authenticate the caller with [`crate::auth::authenticate`],
//! talk to the datastore through [`crate::db::handlers`] repositories and return
//! [`crate::errors::Error`] on failure, which renders as a status code plus a JSON
//! `{"error": "..."}` body.
//!
//! - [`videos`]: video reads and thumbnail uploads

pub mod videos;
