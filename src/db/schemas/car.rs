//! Car document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for cars
pub const CAR_COLLECTION: &str = "cars";

/// Car document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CarDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// created_at doubles as the listing time
    #[serde(default)]
    pub metadata: Metadata,

    pub make: String,
    pub model: String,
    pub price: f64,

    /// Email of the user who added the car (not enforced as a foreign key)
    pub owner_email: String,

    #[serde(default)]
    pub sold: bool,
}

impl CarDoc {
    /// New unsold car owned by `owner_email`
    pub fn new(make: String, model: String, price: f64, owner_email: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            make,
            model,
            price,
            owner_email,
            sold: false,
        }
    }

    pub fn summary(&self) -> CarSummary {
        CarSummary {
            make: self.make.clone(),
            model: self.model.clone(),
            price: self.price,
            owner_email: self.owner_email.clone(),
            sold: self.sold,
            created_at: self.metadata.created_at_utc(),
        }
    }
}

/// Car as returned by the API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarSummary {
    pub make: String,
    pub model: String,
    pub price: f64,
    pub owner_email: String,
    pub sold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl IntoIndexes for CarDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "owner_email": 1 },
            Some(
                IndexOptions::builder()
                    .name("owner_email_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CarDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
