//! Database schemas for carport
//!
//! Defines MongoDB document structures for users and cars.

mod car;
mod metadata;
mod user;

pub use car::{CarDoc, CarSummary, CAR_COLLECTION};
pub use metadata::Metadata;
pub use user::{UserDoc, UserSummary, USER_COLLECTION};
