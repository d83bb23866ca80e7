//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. One task per
//! connection; requests share nothing but the `AppState` handle.

use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::{CarStore, MemoryStore, MongoClient, MongoStore, UserStore};
use crate::routes::{self, ResponseBody};
use crate::types::ApiError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub users: Arc<dyn UserStore>,
    pub cars: Arc<dyn CarStore>,
    /// Token issuer/verifier built from SECRET_KEY
    pub jwt: JwtValidator,
    /// Backend name reported by /health
    pub store_kind: &'static str,
    pub started_at: Instant,
}

impl AppState {
    /// Create AppState from already-built collaborators
    pub fn new(
        args: Args,
        users: Arc<dyn UserStore>,
        cars: Arc<dyn CarStore>,
        jwt: JwtValidator,
        store_kind: &'static str,
    ) -> Self {
        Self {
            args,
            users,
            cars,
            jwt,
            store_kind,
            started_at: Instant::now(),
        }
    }

    /// AppState over a fresh in-memory store (dev mode, tests)
    pub fn in_memory(args: Args) -> Result<Self, ApiError> {
        let jwt = args.jwt_validator()?;
        let store = Arc::new(MemoryStore::new());
        Ok(Self::new(args, store.clone(), store, jwt, "memory"))
    }

    /// AppState over MongoDB; connects, pings and applies indexes
    pub async fn with_mongo(args: Args) -> Result<Self, ApiError> {
        let jwt = args.jwt_validator()?;
        let uri = args
            .mongodb_uri
            .as_deref()
            .ok_or_else(|| ApiError::Config("MONGO_URI is required".into()))?;

        let client = MongoClient::new(uri, &args.mongodb_db, args.request_timeout()).await?;
        let store = Arc::new(MongoStore::new(client).await?);
        Ok(Self::new(args, store.clone(), store, jwt, "mongodb"))
    }
}

/// Start the HTTP server; returns after ctrl-c
pub async fn run(state: Arc<AppState>) -> Result<(), ApiError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "carport listening on {} (store: {})",
        state.args.listen, state.store_kind
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - data is not persisted");
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!("Accepted connection from {}", addr);
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { Ok::<_, Infallible>(handle_request(state, req).await) }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        }
    }
}

/// Route incoming HTTP requests
///
/// Always produces exactly one response; handler errors become JSON error
/// bodies with the status their variant maps to.
pub async fn handle_request<B>(state: Arc<AppState>, req: Request<B>) -> Response<ResponseBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("{} {}", method, path);

    if method == Method::OPTIONS {
        return routes::cors_preflight();
    }

    let result = match (&method, path.as_str()) {
        (&Method::POST, "/signup") => routes::handle_signup(req, state).await,
        (&Method::POST, "/login") => routes::handle_login(req, state).await,
        (&Method::GET, "/") => routes::handle_list_users(req, state).await,
        (&Method::POST, "/add-car") => routes::handle_add_car(req, state).await,
        (&Method::GET, "/cars") => routes::handle_list_cars(req, state).await,

        (&Method::GET, "/health") => Ok(routes::health_check(state)),
        (&Method::GET, "/ready") => Ok(routes::readiness_check(state).await),
        (&Method::GET, "/version") => Ok(routes::version_info()),

        (_, "/signup" | "/login" | "/" | "/add-car" | "/cars" | "/health" | "/ready" | "/version") => {
            Err(ApiError::MethodNotAllowed(format!("{} not allowed on {}", method, path)))
        }

        _ => Err(ApiError::NotFound(format!("No route for {}", path))),
    };

    result.unwrap_or_else(|err| routes::error_response(&err))
}
