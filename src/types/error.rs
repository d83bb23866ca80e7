//! Error types for carport
//!
//! Every handler failure is one of these variants; the router turns it into
//! a status code and a JSON body, so each request gets exactly one response.

use hyper::StatusCode;

/// Main error type for carport operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad credentials, missing token or invalid token
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Unique constraint violated (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store unreachable, timed out or rejected the operation
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Stored password digest could not be parsed
    #[error("Verification error: {0}")]
    Verification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Verification(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::Conflict(_) => "CONFLICT",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Verification(_) => "VERIFICATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Server-side failures are logged in full but reported generically.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Authentication(msg)
            | Self::NotFound(msg)
            | Self::MethodNotAllowed(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Persistence(_) => "Database not available".to_string(),
            Self::Verification(_) | Self::Config(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Whether the failure originates on the server side
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// MongoDB server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY_CODE {
                return Self::Conflict("An account with this email already exists".into());
            }
        }
        Self::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Invalid JSON: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for ApiError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Persistence("Store operation timed out".into())
    }
}

/// Result type alias for carport operations
pub type Result<T> = std::result::Result<T, ApiError>;
