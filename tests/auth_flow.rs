//! End-to-end flows through the router with the in-memory store

use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use carport::{
    auth::JwtValidator,
    config::Args,
    db::{MemoryStore, UserDoc, UserStore},
    server::{handle_request, AppState},
};

const SECRET: &str = "integration-secret-at-least-32-characters";
const OTHER_SECRET: &str = "another-integration-secret-32-characters";

struct Harness {
    state: Arc<AppState>,
    store: Arc<MemoryStore>,
}

fn harness() -> Harness {
    let args = Args::try_parse_from(["carport", "--dev-mode", "--jwt-secret", SECRET]).unwrap();
    let jwt = args.jwt_validator().unwrap();
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(args, store.clone(), store.clone(), jwt, "memory");
    Harness {
        state: Arc::new(state),
        store,
    }
}

async fn send(
    h: &Harness,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authentication", token);
    }
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let req = builder.body(Full::new(Bytes::from(body))).unwrap();

    let response = handle_request(Arc::clone(&h.state), req).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

async fn signup(h: &Harness, email: &str, password: &str) -> StatusCode {
    send(
        h,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
    .0
}

async fn login(h: &Harness, email: &str, password: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(
        h,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login_token(h: &Harness, email: &str, password: &str) -> String {
    let (status, body) = login(h, email, password).await;
    assert_eq!(status, StatusCode::OK);
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_flow() {
    let h = harness();

    let (status, bytes) = send(
        &h,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "a@x.com", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(&bytes[..], b"User was added");

    let token = login_token(&h, "a@x.com", "pw1").await;

    let (status, bytes) = send(&h, Method::GET, "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users: Value = serde_json::from_slice(&bytes).unwrap();
    let emails: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert!(emails.contains(&"a@x.com"));

    let (status, bytes) = send(
        &h,
        Method::POST,
        "/add-car",
        Some(&token),
        Some(json!({ "make": "Civic", "model": "X", "price": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(&bytes[..], b"Car was added");

    let cars = h.store.cars();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].owner_email, "a@x.com");
    assert_eq!(cars[0].make, "Civic");
    assert_eq!(cars[0].model, "X");
    assert_eq!(cars[0].price, 1000.0);
    assert!(!cars[0].sold);
    assert!(cars[0].metadata.created_at.is_some());

    let (status, bytes) = send(&h, Method::GET, "/cars", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed[0]["ownerEmail"], "a@x.com");
    assert_eq!(listed[0]["sold"], false);
}

#[tokio::test]
async fn test_login_token_decodes_with_same_secret() {
    let h = harness();
    assert_eq!(signup(&h, "a@x.com", "pw1").await, StatusCode::CREATED);
    let token = login_token(&h, "a@x.com", "pw1").await;

    let same = JwtValidator::new(SECRET, 3600).unwrap();
    assert_eq!(same.verify_token(&token).unwrap().email, "a@x.com");

    let other = JwtValidator::new(OTHER_SECRET, 3600).unwrap();
    assert!(other.verify_token(&token).is_err());
}

#[tokio::test]
async fn test_wrong_password_gets_no_token() {
    let h = harness();
    signup(&h, "a@x.com", "pw1").await;

    let (status, body) = login(&h, "a@x.com", "nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("accessToken").is_none());
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_unknown_user_looks_like_wrong_password() {
    let h = harness();

    let (status, body) = login(&h, "ghost@x.com", "pw1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let h = harness();

    let (status, _) = send(&h, Method::POST, "/signup", None, Some(json!({ "email": "a@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = login(&h, "", "pw1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert!(h.store.cars().is_empty());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let h = harness();
    assert_eq!(signup(&h, "a@x.com", "pw1").await, StatusCode::CREATED);
    assert_eq!(signup(&h, "a@x.com", "pw2").await, StatusCode::CONFLICT);

    // Original password still works
    login_token(&h, "a@x.com", "pw1").await;
}

#[tokio::test]
async fn test_protected_routes_reject_missing_and_tampered_tokens() {
    let h = harness();
    signup(&h, "a@x.com", "pw1").await;
    let token = login_token(&h, "a@x.com", "pw1").await;

    let (status, _) = send(&h, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut tampered = token.clone();
    tampered.insert(tampered.len() / 2, 'x');
    let (status, _) = send(&h, Method::GET, "/", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let car = json!({ "make": "Civic", "model": "X", "price": 1000 });
    let (status, _) = send(&h, Method::POST, "/add-car", None, Some(car.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&h, Method::POST, "/add-car", Some(&tampered), Some(car)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(h.store.cars().is_empty());

    let (status, _) = send(&h, Method::GET, "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let h = harness();
    let foreign = JwtValidator::new(OTHER_SECRET, 3600)
        .unwrap()
        .issue_token("a@x.com")
        .unwrap()
        .token;

    let (status, _) = send(&h, Method::GET, "/", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_listing_never_leaks_hash() {
    let h = harness();
    signup(&h, "a@x.com", "pw1").await;
    let token = login_token(&h, "a@x.com", "pw1").await;

    let (_, bytes) = send(&h, Method::GET, "/", Some(&token), None).await;
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains("argon2"));
    assert!(!text.contains("password"));
}

#[tokio::test]
async fn test_cars_are_scoped_to_owner() {
    let h = harness();
    signup(&h, "a@x.com", "pw1").await;
    signup(&h, "b@x.com", "pw2").await;
    let a = login_token(&h, "a@x.com", "pw1").await;
    let b = login_token(&h, "b@x.com", "pw2").await;

    send(
        &h,
        Method::POST,
        "/add-car",
        Some(&a),
        Some(json!({ "make": "Civic", "model": "X", "price": 1000 })),
    )
    .await;

    let (_, bytes) = send(&h, Method::GET, "/cars", Some(&b), None).await;
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_car_requires_fields() {
    let h = harness();
    signup(&h, "a@x.com", "pw1").await;
    let token = login_token(&h, "a@x.com", "pw1").await;

    let (status, _) = send(
        &h,
        Method::POST,
        "/add-car",
        Some(&token),
        Some(json!({ "make": "Civic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.store.cars().is_empty());
}

#[tokio::test]
async fn test_malformed_stored_digest_is_server_error() {
    let h = harness();
    h.store
        .insert_user(UserDoc::new("a@x.com".into(), "not-a-phc".into()))
        .await
        .unwrap();

    let (status, body) = login(&h, "a@x.com", "pw1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "VERIFICATION_ERROR");
    assert_eq!(body["error"], "Internal server error");
    assert!(body.get("accessToken").is_none());
}

#[tokio::test]
async fn test_padded_email_is_the_same_account() {
    let h = harness();
    assert_eq!(signup(&h, " a@x.com ", "pw1").await, StatusCode::CREATED);
    assert_eq!(signup(&h, "a@x.com", "pw2").await, StatusCode::CONFLICT);

    let token = login_token(&h, "a@x.com", "pw1").await;
    let claims = JwtValidator::new(SECRET, 3600)
        .unwrap()
        .verify_token(&token)
        .unwrap();
    assert_eq!(claims.email, "a@x.com");
}
