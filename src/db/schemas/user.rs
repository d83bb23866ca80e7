//! User document schema
//!
//! Stores login credentials. The password hash stays inside the store layer;
//! clients only ever see a `UserSummary`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Login email, unique across users
    pub email: String,

    /// Argon2 password hash (PHC string)
    pub password_hash: String,
}

impl UserDoc {
    /// Create a new user document
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            email,
            password_hash,
        }
    }

    /// Public projection without credentials
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            email: self.email.clone(),
            created_at: self.metadata.created_at_utc(),
        }
    }
}

/// User as returned by the API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
