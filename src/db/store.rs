//! Store interfaces used by the route handlers
//!
//! Handlers only see `UserStore` and `CarStore`, injected through `AppState`.
//! `MongoStore` backs production; `MemoryStore` backs dev mode and tests.

use bson::doc;
use tracing::warn;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{CarDoc, UserDoc, CAR_COLLECTION, USER_COLLECTION};
use crate::types::ApiError;

/// Persistence for user credentials
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a duplicate email is a `Conflict`
    async fn insert_user(&self, user: UserDoc) -> Result<(), ApiError>;
    /// Look up a user by exact email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, ApiError>;
    /// All users, in insertion order where the backend preserves it
    async fn list_users(&self) -> Result<Vec<UserDoc>, ApiError>;
    /// Check the backend is reachable
    async fn ping(&self) -> Result<(), ApiError>;
}

/// Persistence for cars
#[async_trait::async_trait]
pub trait CarStore: Send + Sync {
    async fn insert_car(&self, car: CarDoc) -> Result<(), ApiError>;
    /// Cars whose `owner_email` matches
    async fn find_cars_by_owner(&self, owner_email: &str) -> Result<Vec<CarDoc>, ApiError>;
}

/// MongoDB-backed store for both collections
pub struct MongoStore {
    client: MongoClient,
    users: MongoCollection<UserDoc>,
    cars: MongoCollection<CarDoc>,
}

impl MongoStore {
    /// Open both collections and apply their indexes
    pub async fn new(client: MongoClient) -> Result<Self, ApiError> {
        let users = client.collection::<UserDoc>(USER_COLLECTION).await?;
        let cars = client.collection::<CarDoc>(CAR_COLLECTION).await?;
        Ok(Self {
            client,
            users,
            cars,
        })
    }
}

#[async_trait::async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: UserDoc) -> Result<(), ApiError> {
        let email = user.email.clone();
        self.users.insert_one(user).await.inspect_err(|e| {
            if matches!(e, ApiError::Conflict(_)) {
                warn!("Duplicate signup rejected by unique index: {}", email);
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, ApiError> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn list_users(&self) -> Result<Vec<UserDoc>, ApiError> {
        self.users.find_many(doc! {}).await
    }

    async fn ping(&self) -> Result<(), ApiError> {
        self.client.ping().await
    }
}

#[async_trait::async_trait]
impl CarStore for MongoStore {
    async fn insert_car(&self, car: CarDoc) -> Result<(), ApiError> {
        self.cars.insert_one(car).await
    }

    async fn find_cars_by_owner(&self, owner_email: &str) -> Result<Vec<CarDoc>, ApiError> {
        self.cars
            .find_many(doc! { "owner_email": owner_email })
            .await
    }
}
