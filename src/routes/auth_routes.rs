//! HTTP Routes for Authentication
//!
//! - POST /signup - Create an account from email and password
//! - POST /login  - Check credentials and return an access token

use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{spawn_hash, spawn_verify};
use crate::db::UserDoc;
use crate::routes::response::{json_response, parse_json_body, text_response, ResponseBody};
use crate::server::AppState;
use crate::types::ApiError;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body of `/signup` and `/login`; fields are checked before any handler logic
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Credentials that passed presence checks; the email is stored trimmed
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok(Credentials {
                    email: email.trim().to_string(),
                    password,
                })
            }
            _ => Err(ApiError::Validation(
                "Missing required fields: email, password".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// Unix timestamp after which the token is rejected
    pub expires_at: u64,
}

/// Same message for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Invalid credentials";

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /signup
///
/// Flow:
/// 1. Validate required fields
/// 2. Reject an email that already exists
/// 3. Hash password with argon2
/// 4. Store the user (unique index catches concurrent duplicates)
pub async fn handle_signup<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: CredentialsRequest = parse_json_body(req).await?;
    let credentials = body.validate()?;

    if state
        .users
        .find_user_by_email(&credentials.email)
        .await?
        .is_some()
    {
        warn!("Signup rejected - email exists: {}", credentials.email);
        return Err(ApiError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let password_hash = spawn_hash(credentials.password).await?;

    state
        .users
        .insert_user(UserDoc::new(credentials.email.clone(), password_hash))
        .await?;

    info!("Registered new user: {}", credentials.email);
    Ok(text_response(StatusCode::CREATED, "User was added"))
}

/// POST /login
///
/// Flow:
/// 1. Look up user by email
/// 2. Verify password hash with argon2
/// 3. Only on a match, issue and return a JWT
pub async fn handle_login<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: CredentialsRequest = parse_json_body(req).await?;
    let credentials = body.validate()?;

    let Some(user) = state.users.find_user_by_email(&credentials.email).await? else {
        // Use generic error to prevent user enumeration
        warn!("Login failed - user not found: {}", credentials.email);
        return Err(ApiError::Authentication(INVALID_CREDENTIALS.into()));
    };

    let password_valid = spawn_verify(credentials.password, user.password_hash).await?;

    if !password_valid {
        warn!("Login failed - invalid password: {}", credentials.email);
        return Err(ApiError::Authentication(INVALID_CREDENTIALS.into()));
    }

    let issued = state.jwt.issue_token(&user.email)?;

    info!("Login successful: {}", user.email);
    Ok(json_response(
        StatusCode::OK,
        &LoginResponse {
            access_token: issued.token,
            expires_at: issued.expires_at,
        },
    ))
}
