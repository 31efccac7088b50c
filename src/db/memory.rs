//! In-memory store backend
//!
//! Used by tests and by `STORE_BACKEND=memory`. Contents are lost on restart.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::store::{ActionStore, CredentialStore, LicenseStore};
use crate::types::{ActionEvent, CredentialRecord, License, Result, TurnkeyError};

/// Simple in-memory implementation of every store capability
#[derive(Default)]
pub struct MemoryStore {
    credentials: RwLock<HashMap<String, CredentialRecord>>,
    licenses: RwLock<HashMap<(String, String), License>>,
    actions: RwLock<Vec<ActionEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_credential(&self, record: CredentialRecord) -> Result<CredentialRecord> {
        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(&record.uid) {
            return Err(TurnkeyError::Database(format!(
                "duplicate uid: {}",
                record.uid
            )));
        }
        credentials.insert(record.uid.clone(), record.clone());
        Ok(record)
    }

    async fn find_credential(&self, uid: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.credentials.read().await.get(uid).cloned())
    }

    async fn pin_hash(&self, uid: &str, hash: &str) -> Result<bool> {
        let mut credentials = self.credentials.write().await;
        match credentials.get_mut(uid) {
            Some(record) if record.hash.is_none() => {
                record.hash = Some(hash.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl LicenseStore for MemoryStore {
    async fn upsert_license(&self, license: License) -> Result<License> {
        let key = (license.uid.clone(), license.service.clone());
        self.licenses.write().await.insert(key, license.clone());
        Ok(license)
    }

    async fn find_licenses(&self, uid: &str) -> Result<Vec<License>> {
        let mut found: Vec<License> = self
            .licenses
            .read()
            .await
            .values()
            .filter(|license| license.uid == uid)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.service.cmp(&b.service));
        Ok(found)
    }
}

#[async_trait::async_trait]
impl ActionStore for MemoryStore {
    async fn insert_action(&self, event: ActionEvent) -> Result<ActionEvent> {
        self.actions.write().await.push(event.clone());
        Ok(event)
    }

    async fn find_actions(
        &self,
        uid: &str,
        service: &str,
        action: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActionEvent>> {
        Ok(self
            .actions
            .read()
            .await
            .iter()
            .filter(|e| {
                e.uid == uid && e.service == service && e.action == action && e.created_at >= since
            })
            .cloned()
            .collect())
    }
}
