//! JWT access token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    config::Config,
    errors::{Error, Result},
    types::UserId,
};

/// JWT access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String, // Issuer
    pub sub: String, // Subject (user ID)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
}

fn secret_key(config: &Config) -> Result<&str> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "load JWT secret: secret_key is required".to_string(),
    })
}

fn invalid_token() -> Error {
    Error::Unauthenticated {
        message: Some("Couldn't validate JWT".to_string()),
    }
}

/// Create a signed access token for `user_id`, valid for `expires_in`
pub fn make_jwt(user_id: UserId, config: &Config, expires_in: Duration) -> Result<String> {
    let now = Utc::now();
    let expires_in = chrono::Duration::from_std(expires_in).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })?;

    let claims = AccessClaims {
        iss: config.auth.issuer.clone(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify an access token and return the user it was issued to
pub fn validate_jwt(token: &str, config: &Config) -> Result<UserId> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());

    let mut validation = Validation::default();
    validation.set_issuer(&[config.auth.issuer.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = config.auth.leeway.as_secs();

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => {
            tracing::debug!(error = %e, "Rejected bearer token");
            invalid_token()
        }

        // Server errors (500) - key issues, internal failures
        _ => Error::Internal {
            operation: format!("verify JWT: {e}"),
        },
    })?;

    token_data.claims.sub.parse::<UserId>().map_err(|_| invalid_token())
}
