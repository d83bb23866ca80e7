//! Database layer for carport
//!
//! Provides MongoDB storage for users and cars, plus an in-memory store
//! with the same interface.

pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{CarDoc, CarSummary, Metadata, UserDoc, UserSummary};
pub use store::{CarStore, MongoStore, UserStore};
