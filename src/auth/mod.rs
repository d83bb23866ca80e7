//! Authentication for carport
//!
//! Provides:
//! - Password hashing with Argon2
//! - JWT token issuance and validation
//! - The request guard protecting user and car routes

pub mod guard;
pub mod jwt;
pub mod password;

pub use guard::{require_claims, Authorization, AUTHENTICATION_HEADER};
pub use jwt::{extract_token_from_header, Claims, IssuedToken, JwtValidator};
pub use password::{hash_password, spawn_hash, spawn_verify, verify_password};
