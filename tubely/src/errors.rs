use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// A path or body identifier could not be parsed
    #[error("{message}")]
    InvalidIdentifier { message: String },

    /// Authentication required but missing or invalid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated caller does not own the target resource
    #[error("Caller does not own the resource")]
    NotOwner,

    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Declared media type is not one of the accepted image types
    #[error("Unsupported media type {media_type}")]
    UnsupportedMediaType { media_type: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),
}

/// JSON body for every error response that carries one
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } | Error::NotOwner => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::UnsupportedMediaType { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Lookup failures of any kind surface as server errors
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidIdentifier { message } => message.clone(),
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::NotOwner => String::new(),
            Error::BadRequest { message } => message.clone(),
            Error::UnsupportedMediaType { .. } => "Unsupported media type".to_string(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            // Only the leading clause of the operation reaches the client; anything after ':' is detail
            Error::Internal { operation } => {
                let short = operation.split(':').next().unwrap_or(operation).trim();
                format!("Failed to {short}")
            }
            Error::Database(_) => "Database error occurred".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Database(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Unauthenticated { .. } | Error::NotOwner => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::InvalidIdentifier { .. } | Error::BadRequest { .. } | Error::UnsupportedMediaType { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match self {
            // Ownership mismatches carry no detail at all
            Error::NotOwner => status.into_response(),
            _ => (
                status,
                Json(ErrorResponse {
                    error: self.user_message(),
                }),
            )
                .into_response(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (
                Error::InvalidIdentifier {
                    message: "Invalid ID".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::Unauthenticated { message: None }, StatusCode::UNAUTHORIZED),
            (Error::NotOwner, StatusCode::UNAUTHORIZED),
            (
                Error::UnsupportedMediaType {
                    media_type: "image/gif".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::Database(DbError::NotFound), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::Internal {
                    operation: "get video data".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "unexpected status for {error:?}");
        }
    }

    #[test]
    fn test_internal_message_hides_detail() {
        let error = Error::Internal {
            operation: "create thumbnail file: Permission denied (os error 13)".to_string(),
        };
        assert_eq!(error.user_message(), "Failed to create thumbnail file");
        assert!(error.to_string().contains("Permission denied"));
    }

    #[test]
    fn test_not_owner_has_empty_body() {
        let response = Error::NotOwner.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(axum::http::header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_error_body_is_json() {
        let response = Error::BadRequest {
            message: "Failed to parse multipart form".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
