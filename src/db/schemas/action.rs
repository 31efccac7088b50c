//! Action event document schema
//!
//! Append-only. The daily window query filters on `metadata.created_at`.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::ActionEvent;

/// Collection name for action events
pub const ACTION_COLLECTION: &str = "actions";

/// Action event document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ActionDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub uid: String,

    pub service: String,

    pub action: String,

    /// Opaque client payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl From<ActionEvent> for ActionDoc {
    fn from(event: ActionEvent) -> Self {
        Self {
            _id: None,
            metadata: Metadata::created(DateTime::from_chrono(event.created_at)),
            uid: event.uid,
            service: event.service,
            action: event.action,
            data: event.data,
        }
    }
}

impl From<ActionDoc> for ActionEvent {
    fn from(doc: ActionDoc) -> Self {
        Self {
            uid: doc.uid,
            service: doc.service,
            action: doc.action,
            data: doc.data,
            created_at: doc
                .metadata
                .created_at
                .map(|at| at.to_chrono())
                .unwrap_or_default(),
        }
    }
}

impl IntoIndexes for ActionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "uid": 1, "service": 1, "action": 1, "metadata.created_at": 1 },
            Some(
                IndexOptions::builder()
                    .name("uid_service_action_created".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for ActionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
