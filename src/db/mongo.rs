//! MongoDB client and collection wrapper
//!
//! Every collection operation runs under the configured timeout so a stalled
//! server surfaces as a persistence error instead of a hung request.

use bson::{doc, Document};
use mongodb::{options::IndexOptions, Client, Collection, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use std::future::IntoFuture;
use std::time::Duration;
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::ApiError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
    op_timeout: Duration,
}

impl MongoClient {
    /// Connect and ping the server
    pub async fn new(uri: &str, db_name: &str, op_timeout: Duration) -> Result<Self, ApiError> {
        info!("Connecting to MongoDB database '{}'", db_name);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| ApiError::Persistence(format!("Failed to connect to MongoDB: {}", e)))?;

        let mongo = Self {
            client,
            db_name: db_name.to_string(),
            op_timeout,
        };
        mongo.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(mongo)
    }

    /// Round-trip a ping command
    pub async fn ping(&self) -> Result<(), ApiError> {
        with_timeout(
            self.op_timeout,
            self.client
                .database(&self.db_name)
                .run_command(doc! { "ping": 1 }),
        )
        .await
        .map_err(|e| ApiError::Persistence(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a typed collection, applying its indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, ApiError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name, self.op_timeout).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
    op_timeout: Duration,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
        op_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection {
            inner: collection,
            op_timeout,
        };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), ApiError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        with_timeout(self.op_timeout, self.inner.create_indexes(indices))
            .await
            .map_err(|e| ApiError::Persistence(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<(), ApiError> {
        item.mut_metadata().stamp();

        with_timeout(self.op_timeout, self.inner.insert_one(item)).await?;
        Ok(())
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, ApiError> {
        with_timeout(self.op_timeout, self.inner.find_one(filter)).await
    }

    /// Find many documents by filter
    ///
    /// Documents that fail to deserialize are logged and skipped.
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, ApiError> {
        use futures_util::StreamExt;

        let cursor = with_timeout(self.op_timeout, self.inner.find(filter)).await?;

        let collect = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect::<Vec<T>>();

        Ok(tokio::time::timeout(self.op_timeout, collect).await?)
    }
}

/// Await a driver future, mapping both the timeout and the driver error
async fn with_timeout<F, R>(op_timeout: Duration, fut: F) -> Result<R, ApiError>
where
    F: IntoFuture<Output = mongodb::error::Result<R>>,
{
    Ok(tokio::time::timeout(op_timeout, fut).await??)
}
