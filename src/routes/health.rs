//! Health check endpoints
//!
//! - /health - Liveness probe, 200 whenever the process serves requests
//! - /ready  - Readiness probe, 200 only when the store answers a ping
//! - /version - Build information captured by build.rs

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::routes::response::{json_response, ResponseBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    pub version: &'static str,
    /// Seconds since the state was built
    pub uptime: u64,
    /// Store backend: "mongodb" or "memory"
    pub store: &'static str,
    /// Whether the store answered (readiness only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_reachable: Option<bool>,
    pub mode: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        store: state.store_kind,
        store_reachable: None,
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
        error: None,
    }
}

/// Handle liveness probe (/health)
pub fn health_check(state: Arc<AppState>) -> Response<ResponseBody> {
    json_response(StatusCode::OK, &build_health_response(&state))
}

/// Handle readiness probe (/ready)
///
/// Pings the store; 503 when it cannot be reached.
pub async fn readiness_check(state: Arc<AppState>) -> Response<ResponseBody> {
    let mut response = build_health_response(&state);

    let status = match state.users.ping().await {
        Ok(()) => {
            response.store_reachable = Some(true);
            StatusCode::OK
        }
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            response.healthy = false;
            response.store_reachable = Some(false);
            response.error = Some(e.public_message());
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<ResponseBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
            commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
            build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            service: "carport",
        },
    )
}
