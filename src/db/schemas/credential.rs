//! Credential document schema
//!
//! One document per identity. `hash` stays null until the first sign-in.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::CredentialRecord;

/// Collection name for credentials
pub const CREDENTIAL_COLLECTION: &str = "auth";

/// Credential document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CredentialDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Identity uid (doubles as the license key)
    pub uid: String,

    /// Display name
    pub name: String,

    /// Pinned auth key (serialized as null until pinned)
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub salt: Option<String>,
}

impl From<CredentialRecord> for CredentialDoc {
    fn from(record: CredentialRecord) -> Self {
        Self {
            _id: None,
            metadata: Metadata::created(DateTime::from_chrono(record.created_at)),
            uid: record.uid,
            name: record.name,
            hash: record.hash,
            salt: record.salt,
        }
    }
}

impl From<CredentialDoc> for CredentialRecord {
    fn from(doc: CredentialDoc) -> Self {
        Self {
            uid: doc.uid,
            name: doc.name,
            hash: doc.hash,
            salt: doc.salt,
            created_at: doc
                .metadata
                .created_at
                .map(|at| at.to_chrono())
                .unwrap_or_default(),
        }
    }
}

impl IntoIndexes for CredentialDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "uid": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("uid_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CredentialDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use chrono::{TimeZone, Utc};

    fn record() -> CredentialRecord {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        CredentialRecord::new("uid-1".into(), "Alice".into(), created_at)
    }

    #[test]
    fn test_unpinned_hash_is_stored_as_null() {
        let doc = bson::to_document(&CredentialDoc::from(record())).unwrap();

        // The conditional pin filters on `hash: null`, so the field must exist
        assert_eq!(doc.get("hash"), Some(&Bson::Null));
        assert!(doc.get("_id").is_none());
        assert_eq!(doc.get_str("uid").unwrap(), "uid-1");
        assert!(doc
            .get_document("metadata")
            .unwrap()
            .get_datetime("created_at")
            .is_ok());
    }

    #[test]
    fn test_pinned_record_survives_bson() {
        let mut original = record();
        original.hash = Some("device-key".into());

        let doc = bson::to_document(&CredentialDoc::from(original.clone())).unwrap();
        let decoded: CredentialDoc = bson::from_document(doc).unwrap();

        assert_eq!(CredentialRecord::from(decoded), original);
    }

    #[test]
    fn test_uid_index_is_unique() {
        let indices = CredentialDoc::into_indices();
        assert_eq!(indices.len(), 1);
        assert_eq!(indices[0].0, doc! { "uid": 1 });
        assert_eq!(indices[0].1.as_ref().and_then(|o| o.unique), Some(true));
    }
}
