//! GET / - list registered users (protected)

use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

use crate::auth::require_claims;
use crate::db::UserSummary;
use crate::routes::response::{json_response, ResponseBody};
use crate::server::AppState;
use crate::types::ApiError;

/// Return every user without credentials
pub async fn handle_list_users<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, ApiError> {
    let claims = require_claims(req.headers(), &state.jwt)?;

    let users: Vec<UserSummary> = state
        .users
        .list_users()
        .await?
        .iter()
        .map(|u| u.summary())
        .collect();

    debug!("{} listed {} users", claims.email, users.len());
    Ok(json_response(StatusCode::OK, &users))
}
