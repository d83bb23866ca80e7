//! Request guard for protected routes
//!
//! Each request lands in exactly one of three states. `NoToken` and
//! `InvalidToken` are terminal and reject with 401; only `Valid` reaches the
//! handler, carrying the decoded claims.

use hyper::HeaderMap;
use tracing::warn;

use crate::auth::jwt::{extract_token_from_header, Claims, JwtValidator};
use crate::types::ApiError;

/// Header the web client sends the access token in
pub const AUTHENTICATION_HEADER: &str = "authentication";

/// Outcome of checking a request for a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// No usable token in the request headers
    NoToken,
    /// A token was present but failed verification
    InvalidToken(String),
    /// Token verified; claims identify the caller
    Valid(Claims),
}

impl Authorization {
    /// Inspect request headers and verify any token found.
    ///
    /// Reads the `authentication` header first, then falls back to the
    /// standard `Authorization` header.
    pub fn from_headers(headers: &HeaderMap, jwt: &JwtValidator) -> Self {
        let header = headers
            .get(AUTHENTICATION_HEADER)
            .or_else(|| headers.get(hyper::header::AUTHORIZATION))
            .and_then(|v| v.to_str().ok());

        let Some(token) = extract_token_from_header(header) else {
            return Self::NoToken;
        };

        match jwt.verify_token(token) {
            Ok(claims) => Self::Valid(claims),
            Err(ApiError::Authentication(reason)) => Self::InvalidToken(reason),
            Err(other) => Self::InvalidToken(other.to_string()),
        }
    }

    /// Collapse into the claims or the 401 the caller should send
    pub fn into_claims(self) -> Result<Claims, ApiError> {
        match self {
            Self::Valid(claims) => Ok(claims),
            Self::NoToken => Err(ApiError::Authentication(
                "No token found, please log in again".into(),
            )),
            Self::InvalidToken(reason) => {
                warn!("Rejected token: {}", reason);
                Err(ApiError::Authentication(reason))
            }
        }
    }
}

/// Require a valid session token on the request
pub fn require_claims(headers: &HeaderMap, jwt: &JwtValidator) -> Result<Claims, ApiError> {
    Authorization::from_headers(headers, jwt).into_claims()
}
