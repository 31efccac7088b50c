//! License document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::License;

/// Collection name for licenses
pub const LICENSE_COLLECTION: &str = "licenses";

/// License document stored in MongoDB, unique per (uid, service)
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LicenseDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub uid: String,

    pub service: String,

    /// Null means the license never expires
    #[serde(default)]
    pub expires_at: Option<DateTime>,
}

impl From<LicenseDoc> for License {
    fn from(doc: LicenseDoc) -> Self {
        Self {
            uid: doc.uid,
            service: doc.service,
            expires_at: doc.expires_at.map(|at| at.to_chrono()),
        }
    }
}

impl IntoIndexes for LicenseDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "uid": 1, "service": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("uid_service_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for LicenseDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
