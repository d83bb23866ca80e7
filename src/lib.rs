//! carport - car inventory API behind password login and JWT sessions
//!
//! Users sign up with an email and password, log in to receive a signed
//! token, and present that token to list users or register cars they own.
//!
//! ## Layout
//!
//! - **auth**: Argon2 password hashing, JWT issuance/verification, request guard
//! - **db**: MongoDB and in-memory document stores behind `UserStore`/`CarStore`
//! - **routes**: HTTP handlers for signup, login, users, cars and health probes
//! - **server**: hyper server loop and request dispatch

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{ApiError, Result};
