//! Domain records shared by the services and store backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public identity of a signed-up user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub name: String,
}

/// Credential record backing an identity.
///
/// `hash` is `None` until the first successful sign-in pins the auth key.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub uid: String,
    pub name: String,
    pub hash: Option<String>,
    pub salt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Fresh record with no pinned auth key
    pub fn new(uid: String, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            uid,
            name,
            hash: None,
            salt: None,
            created_at,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.hash.is_some()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("hash", &self.hash.as_ref().map(|_| "<redacted>"))
            .field("salt", &self.salt.as_ref().map(|_| "<redacted>"))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Per-(uid, service) license grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub uid: String,
    pub service: String,
    /// `None` means the license never expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// Append-only record of a user action within a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub uid: String,
    pub service: String,
    pub action: String,
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let mut record = CredentialRecord::new("uid-1".into(), "Alice".into(), Utc::now());
        record.hash = Some("super-secret-auth-key".into());

        let printed = format!("{:?}", record);
        assert!(printed.contains("uid-1"));
        assert!(!printed.contains("super-secret-auth-key"));
    }

    #[test]
    fn test_identity_from_record() {
        let record = CredentialRecord::new("uid-1".into(), "Alice".into(), Utc::now());
        assert!(!record.is_pinned());
        assert_eq!(
            record.identity(),
            Identity {
                uid: "uid-1".into(),
                name: "Alice".into()
            }
        );
    }
}
