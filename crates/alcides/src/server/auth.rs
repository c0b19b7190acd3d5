//! HTTP Basic authentication against the relay's single shared secret.

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// The only username Alertmanager may present.
pub const RELAY_USERNAME: &str = "alcides";

/// Reasons a request failed authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not valid UTF-8")]
    InvalidHeader,
    #[error("Authorization header has no Basic scheme")]
    NotBasic,
    #[error("Basic credentials are not valid base64: {0}")]
    Decode(String),
    #[error("Basic credentials are not split by username:password")]
    Malformed,
    #[error("incorrect username")]
    UnknownUser,
    #[error("incorrect token")]
    WrongSecret,
}

/// Fixed username plus the configured secret.
#[derive(Clone)]
pub struct Credential {
    secret: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &RELAY_USERNAME)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidHeader)?;

        let (username, secret) = decode_basic(value)?;
        if username != RELAY_USERNAME {
            return Err(AuthError::UnknownUser);
        }
        if !bool::from(secret.as_bytes().ct_eq(self.secret.as_bytes())) {
            return Err(AuthError::WrongSecret);
        }
        Ok(())
    }
}

/// Splits a `Basic <base64>` header value into username and password.
fn decode_basic(value: &str) -> Result<(String, String), AuthError> {
    let (scheme, payload) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(AuthError::NotBasic)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::NotBasic);
    }

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| AuthError::Decode(e.to_string()))?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
    Ok((username.to_string(), password.to_string()))
}
