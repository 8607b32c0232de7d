use crate::errors::{Error, Result};
use axum::http::{HeaderMap, header::AUTHORIZATION};

fn missing_token() -> Error {
    Error::Unauthenticated {
        message: Some("Couldn't find JWT".to_string()),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers.get(AUTHORIZATION).ok_or_else(missing_token)?;
    let value = value.to_str().map_err(|_| missing_token())?;

    let token = value.strip_prefix("Bearer ").ok_or_else(missing_token)?.trim();
    if token.is_empty() {
        return Err(missing_token());
    }

    Ok(token)
}
