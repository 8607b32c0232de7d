//! Request authentication.
//!
//! Callers prove their identity with a signed JWT passed as `Authorization: Bearer <token>`.
//! The token's subject is the caller's [`UserId`].
//!
//! - [`bearer`]: extracting the raw token from request headers
//! - [`jwt`]: issuing and verifying HS256 tokens
//!
//! ```ignore
//! let user_id = auth::authenticate(&headers, &state.config)?;
//! ```

pub mod bearer;
pub mod jwt;

use crate::{config::Config, errors::Result, types::UserId};
use axum::http::HeaderMap;

/// Resolve the authenticated user for a request.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<UserId> {
    let token = bearer::get_bearer_token(headers)?;
    jwt::validate_jwt(token, config)
}
