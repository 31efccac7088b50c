//! Store capabilities the services depend on
//!
//! Backends only need key-equality selects, a `created_at >= since` range
//! filter, upsert-by-key and insert.

use chrono::{DateTime, Utc};

use crate::types::{ActionEvent, CredentialRecord, License, Result};

/// Identity and credential persistence
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new credential record
    async fn insert_credential(&self, record: CredentialRecord) -> Result<CredentialRecord>;

    /// Find a credential record by uid
    async fn find_credential(&self, uid: &str) -> Result<Option<CredentialRecord>>;

    /// Set `hash` only if it is currently unset.
    ///
    /// Returns `true` if this call pinned the value, `false` if the record was
    /// missing or already pinned.
    async fn pin_hash(&self, uid: &str, hash: &str) -> Result<bool>;
}

/// License persistence keyed by (uid, service)
#[async_trait::async_trait]
pub trait LicenseStore: Send + Sync {
    /// Create the license or overwrite the expiry of the existing one
    async fn upsert_license(&self, license: License) -> Result<License>;

    /// All licenses held by a user
    async fn find_licenses(&self, uid: &str) -> Result<Vec<License>>;
}

/// Append-only action log
#[async_trait::async_trait]
pub trait ActionStore: Send + Sync {
    /// Append an event
    async fn insert_action(&self, event: ActionEvent) -> Result<ActionEvent>;

    /// Events for the exact (uid, service, action) triple created at or after `since`
    async fn find_actions(
        &self,
        uid: &str,
        service: &str,
        action: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActionEvent>>;
}
