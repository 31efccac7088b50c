//! Per-service license grants

use std::sync::Arc;
use tracing::info;

use crate::clock;
use crate::db::{CredentialStore, LicenseStore};
use crate::types::{License, Result, TurnkeyError};

/// Grants and lists time-bounded licenses
#[derive(Clone)]
pub struct LicenseLedger {
    credentials: Arc<dyn CredentialStore>,
    licenses: Arc<dyn LicenseStore>,
}

impl LicenseLedger {
    pub fn new(credentials: Arc<dyn CredentialStore>, licenses: Arc<dyn LicenseStore>) -> Self {
        Self {
            credentials,
            licenses,
        }
    }

    /// Grant `service` to `uid` until `expires_in_days` from now.
    ///
    /// Re-granting resets the expiry from the current time rather than
    /// extending the old one.
    pub async fn grant(&self, uid: &str, service: &str, expires_in_days: i64) -> Result<License> {
        if self.credentials.find_credential(uid).await?.is_none() {
            return Err(TurnkeyError::NotFound);
        }

        let expires_at = clock::days_after(clock::utcnow(), expires_in_days).ok_or_else(|| {
            TurnkeyError::BadRequest(format!("expires_in out of range: {}", expires_in_days))
        })?;

        let license = self
            .licenses
            .upsert_license(License {
                uid: uid.to_string(),
                service: service.to_string(),
                expires_at: Some(expires_at),
            })
            .await?;

        info!(uid = %uid, service = %service, expires_at = %expires_at, "License granted");
        Ok(license)
    }

    /// All licenses held by `uid`
    pub async fn list(&self, uid: &str) -> Result<Vec<License>> {
        self.licenses.find_licenses(uid).await
    }
}
