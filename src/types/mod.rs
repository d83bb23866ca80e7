//! Shared types for carport

pub mod error;

pub use error::{ApiError, Result};
