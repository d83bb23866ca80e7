//! JWT token handling for session authentication
//!
//! Provides functions for issuing and verifying the access tokens returned by
//! `/login` and presented to protected routes.
//!
//! Security notes:
//! - Tokens are signed with HS256 (HMAC-SHA256), claims are readable by holders
//! - Every token carries `exp`; default lifetime is 1 hour
//! - Claims hold the email only, never the password hash
//! - In production, SECRET_KEY should be a strong random value from environment

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::ApiError;

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted from configuration (one year)
pub const MAX_EXPIRY_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Payload stored in JWT token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the authenticated user
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Unique token id
    pub jti: String,
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// JWT validator and generator
#[derive(Clone)]
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtValidator {
    /// Create a new JWT validator
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: &str, expiry_seconds: u64) -> Result<Self, ApiError> {
        if secret.is_empty() {
            return Err(ApiError::Config(
                "SECRET_KEY is required in production mode".into(),
            ));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(ApiError::Config(format!(
                "SECRET_KEY must be at least {MIN_SECRET_LEN} characters"
            )));
        }

        Ok(Self::from_secret(secret.as_bytes(), expiry_seconds))
    }

    /// Create a validator for dev mode with the built-in secret
    pub fn new_dev(expiry_seconds: u64) -> Self {
        Self::from_secret(b"dev-mode-secret-not-for-production-use-123456", expiry_seconds)
    }

    fn from_secret(secret: &[u8], expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_seconds,
        }
    }

    /// Issue a token for an authenticated user
    pub fn issue_token(&self, email: &str) -> Result<IssuedToken, ApiError> {
        let now = unix_now()?;
        let exp = now
            .checked_add(self.expiry_seconds)
            .ok_or_else(|| ApiError::Config("Token lifetime overflows the clock".into()))?;

        let claims = Claims {
            email: email.to_string(),
            iat: now,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify and decode a JWT token
    ///
    /// Returns the original claims, or an `Authentication` error naming the
    /// reason (expired, bad signature, malformed).
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                use jsonwebtoken::errors::ErrorKind;
                let error_msg = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    ErrorKind::InvalidToken => "Invalid token",
                    ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                        "Malformed token"
                    }
                    _ => "Token validation failed",
                };
                ApiError::Authentication(error_msg.into())
            })
    }
}

fn unix_now() -> Result<u64, ApiError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ApiError::Internal(format!("System time error: {}", e)))
}

/// Extract token from an authentication header value.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    // Raw token without a scheme prefix
    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
