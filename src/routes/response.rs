//! Response builders and request body parsing shared by all routes

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::types::ApiError;

/// Largest request body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Body type of every response this service sends
pub type ResponseBody = Full<Bytes>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn apply_cors(headers: &mut HeaderMap) {
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization, Authentication"),
    );
}

fn build(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<ResponseBody> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    if !content_type.is_empty() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    apply_cors(headers);
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    build(status, "application/json", Bytes::from(json))
}

pub fn text_response(status: StatusCode, body: &'static str) -> Response<ResponseBody> {
    build(status, "text/plain; charset=utf-8", Bytes::from_static(body.as_bytes()))
}

/// Map an error to its status and JSON body, logging by severity
pub fn error_response(err: &ApiError) -> Response<ResponseBody> {
    if err.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.public_message(),
            code: err.code().to_string(),
        },
    )
}

pub fn cors_preflight() -> Response<ResponseBody> {
    let mut response = build(StatusCode::NO_CONTENT, "", Bytes::new());
    response
        .headers_mut()
        .insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
    response
}

/// Read and decode a JSON body, capped at `MAX_BODY_BYTES`
pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de>,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read body: {}", e)))?;

    Ok(serde_json::from_slice(&body.to_bytes())?)
}
