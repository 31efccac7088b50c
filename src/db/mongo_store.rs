//! MongoDB store backend

use bson::{doc, DateTime};
use chrono::Utc;
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    ActionDoc, CredentialDoc, LicenseDoc, ACTION_COLLECTION, CREDENTIAL_COLLECTION,
    LICENSE_COLLECTION,
};
use crate::db::store::{ActionStore, CredentialStore, LicenseStore};
use crate::types::{ActionEvent, CredentialRecord, License, Result, TurnkeyError};

/// Store capabilities backed by MongoDB collections
pub struct MongoStore {
    credentials: MongoCollection<CredentialDoc>,
    licenses: MongoCollection<LicenseDoc>,
    actions: MongoCollection<ActionDoc>,
}

impl MongoStore {
    /// Open the collections and make sure their indexes exist
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            credentials: mongo.collection(CREDENTIAL_COLLECTION).await?,
            licenses: mongo.collection(LICENSE_COLLECTION).await?,
            actions: mongo.collection(ACTION_COLLECTION).await?,
        })
    }
}

#[async_trait::async_trait]
impl CredentialStore for MongoStore {
    async fn insert_credential(&self, record: CredentialRecord) -> Result<CredentialRecord> {
        let inserted = self.credentials.insert_one(record.into()).await?;
        Ok(inserted.into())
    }

    async fn find_credential(&self, uid: &str) -> Result<Option<CredentialRecord>> {
        Ok(self
            .credentials
            .find_one(doc! { "uid": uid })
            .await?
            .map(Into::into))
    }

    async fn pin_hash(&self, uid: &str, hash: &str) -> Result<bool> {
        // The filter only matches while hash is still null, so concurrent
        // first sign-ins cannot both pin.
        let result = self
            .credentials
            .update_one(
                doc! { "uid": uid, "hash": null },
                doc! {
                    "$set": {
                        "hash": hash,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        debug!(uid = %uid, modified = result.modified_count, "pin_hash");
        Ok(result.modified_count == 1)
    }
}

#[async_trait::async_trait]
impl LicenseStore for MongoStore {
    async fn upsert_license(&self, license: License) -> Result<License> {
        let filter = doc! { "uid": &license.uid, "service": &license.service };
        let now = DateTime::now();

        self.licenses
            .upsert_one(
                filter.clone(),
                doc! {
                    "$set": {
                        "expires_at": license.expires_at.map(DateTime::from_chrono),
                        "metadata.updated_at": now,
                    },
                    "$setOnInsert": { "metadata.created_at": now },
                },
            )
            .await?;

        self.licenses
            .find_one(filter)
            .await?
            .map(Into::into)
            .ok_or_else(|| TurnkeyError::Database("License missing after upsert".into()))
    }

    async fn find_licenses(&self, uid: &str) -> Result<Vec<License>> {
        let docs = self
            .licenses
            .find_many(doc! { "uid": uid }, doc! { "service": 1 })
            .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl ActionStore for MongoStore {
    async fn insert_action(&self, event: ActionEvent) -> Result<ActionEvent> {
        let inserted = self.actions.insert_one(event.into()).await?;
        Ok(inserted.into())
    }

    async fn find_actions(
        &self,
        uid: &str,
        service: &str,
        action: &str,
        since: chrono::DateTime<Utc>,
    ) -> Result<Vec<ActionEvent>> {
        let docs = self
            .actions
            .find_many(
                doc! {
                    "uid": uid,
                    "service": service,
                    "action": action,
                    "metadata.created_at": { "$gte": DateTime::from_chrono(since) },
                },
                doc! { "metadata.created_at": 1 },
            )
            .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }
}
