//! In-memory store for dev mode and tests

use std::sync::RwLock;

use crate::db::mongo::MutMetadata;
use crate::db::schemas::{CarDoc, UserDoc};
use crate::db::store::{CarStore, UserStore};
use crate::types::ApiError;

/// Vec-backed store honouring the same uniqueness rule as the Mongo index
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserDoc>>,
    cars: RwLock<Vec<CarDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored car
    pub fn cars(&self) -> Vec<CarDoc> {
        self.cars.read().map(|c| c.clone()).unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> ApiError {
    ApiError::Internal("In-memory store lock poisoned".into())
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, mut user: UserDoc) -> Result<(), ApiError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::Conflict(
                "An account with this email already exists".into(),
            ));
        }
        user.mut_metadata().stamp();
        users.push(user);
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, ApiError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserDoc>, ApiError> {
        Ok(self.users.read().map_err(poisoned)?.clone())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl CarStore for MemoryStore {
    async fn insert_car(&self, mut car: CarDoc) -> Result<(), ApiError> {
        car.mut_metadata().stamp();
        self.cars.write().map_err(poisoned)?.push(car);
        Ok(())
    }

    async fn find_cars_by_owner(&self, owner_email: &str) -> Result<Vec<CarDoc>, ApiError> {
        let cars = self.cars.read().map_err(poisoned)?;
        Ok(cars
            .iter()
            .filter(|c| c.owner_email == owner_email)
            .cloned()
            .collect())
    }
}
