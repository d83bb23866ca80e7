//! HTTP server for carport

pub mod http;

pub use http::{handle_request, run, AppState};
