//! License-key authentication
//!
//! Sign-up creates a credential record with no auth key. The first sign-in
//! pins whatever auth key it presents; every later sign-in must present that
//! exact key. Successful sign-ins receive an access token listing the services
//! the identity is licensed for.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{constant_time_compare, AccessClaims, TokenCodec, TokenType};
use crate::clock;
use crate::db::{CredentialStore, LicenseStore};
use crate::types::{CredentialRecord, Identity, Result, TurnkeyError};

/// Sign-up, sign-in and bearer token verification
#[derive(Clone)]
pub struct Authenticator {
    codec: TokenCodec,
    credentials: Arc<dyn CredentialStore>,
    licenses: Arc<dyn LicenseStore>,
}

impl Authenticator {
    pub fn new(
        codec: TokenCodec,
        credentials: Arc<dyn CredentialStore>,
        licenses: Arc<dyn LicenseStore>,
    ) -> Self {
        Self {
            codec,
            credentials,
            licenses,
        }
    }

    /// Create a new identity with a fresh uid and no pinned auth key.
    ///
    /// Names are not required to be unique.
    pub async fn sign_up(&self, name: &str) -> Result<Identity> {
        let record = CredentialRecord::new(
            Uuid::new_v4().to_string(),
            name.to_string(),
            clock::utcnow(),
        );

        let record = self.credentials.insert_credential(record).await?;
        info!(uid = %record.uid, "Signed up new identity");
        Ok(record.identity())
    }

    /// Authenticate with a license key and auth key, returning a signed access token.
    ///
    /// An unknown license key and a wrong auth key both fail with
    /// `Unauthorized`.
    pub async fn sign_in(&self, license_key: &str, auth_key: &str) -> Result<String> {
        let record = match self.credentials.find_credential(license_key).await? {
            Some(record) => record,
            None => {
                warn!("Sign-in failed - unknown license key");
                return Err(TurnkeyError::Unauthorized);
            }
        };

        self.check_auth_key(&record, auth_key).await?;

        let services = self
            .licenses
            .find_licenses(&record.uid)
            .await?
            .into_iter()
            .map(|license| license.service)
            .collect();

        let now = clock::to_millis(clock::utcnow());
        let claims = AccessClaims::access(record.uid.clone(), services, now);
        let token = self.codec.encode(&claims)?;

        info!(uid = %record.uid, services = claims.services.len(), "Sign-in successful");
        Ok(token)
    }

    /// Resolve a bearer token to the identity it was issued for
    pub async fn verify(&self, bearer_token: &str) -> Result<Identity> {
        let claims = self.codec.decode(bearer_token)?;

        if claims.token_type != TokenType::Access {
            debug!("Token rejected: not an access token");
            return Err(TurnkeyError::Unauthorized);
        }

        match self.credentials.find_credential(&claims.sub).await? {
            Some(record) => Ok(record.identity()),
            None => {
                // Identity vanished after the token was issued
                warn!(uid = %claims.sub, "Token subject no longer exists");
                Err(TurnkeyError::Unauthorized)
            }
        }
    }

    /// Pin the auth key on first use, otherwise compare against the pinned value
    async fn check_auth_key(&self, record: &CredentialRecord, auth_key: &str) -> Result<()> {
        let pinned = match &record.hash {
            Some(hash) => hash.clone(),
            None => {
                if self.credentials.pin_hash(&record.uid, auth_key).await? {
                    info!(uid = %record.uid, "Auth key pinned on first sign-in");
                    return Ok(());
                }

                // Lost a race with a concurrent first sign-in; compare against
                // whichever key won.
                self.credentials
                    .find_credential(&record.uid)
                    .await?
                    .and_then(|current| current.hash)
                    .ok_or(TurnkeyError::Unauthorized)?
            }
        };

        if constant_time_compare(auth_key, &pinned) {
            Ok(())
        } else {
            warn!(uid = %record.uid, "Sign-in failed - auth key mismatch");
            Err(TurnkeyError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::types::License;
    use tokio_test::assert_ok;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn setup() -> (Authenticator, Arc<MemoryStore>, TokenCodec) {
        let store = Arc::new(MemoryStore::new());
        let codec = TokenCodec::new(SECRET).unwrap();
        let auth = Authenticator::new(codec.clone(), store.clone(), store.clone());
        (auth, store, codec)
    }

    #[tokio::test]
    async fn test_sign_up_creates_unpinned_record() {
        let (auth, store, _) = setup();

        let alice = auth.sign_up("Alice").await.unwrap();
        assert_eq!(alice.name, "Alice");
        assert!(Uuid::parse_str(&alice.uid).is_ok());

        let record = store.find_credential(&alice.uid).await.unwrap().unwrap();
        assert!(record.hash.is_none());
        assert!(record.salt.is_none());

        // Same display name, distinct identities
        let other = auth.sign_up("Alice").await.unwrap();
        assert_ne!(alice.uid, other.uid);
    }

    #[tokio::test]
    async fn test_first_sign_in_pins_auth_key() {
        let (auth, store, _) = setup();
        let alice = auth.sign_up("Alice").await.unwrap();

        assert_ok!(auth.sign_in(&alice.uid, "secret1").await);
        let record = store.find_credential(&alice.uid).await.unwrap().unwrap();
        assert_eq!(record.hash.as_deref(), Some("secret1"));

        assert_ok!(auth.sign_in(&alice.uid, "secret1").await);
        assert!(matches!(
            auth.sign_in(&alice.uid, "wrong").await,
            Err(TurnkeyError::Unauthorized)
        ));

        // A failed attempt does not re-pin
        let record = store.find_credential(&alice.uid).await.unwrap().unwrap();
        assert_eq!(record.hash.as_deref(), Some("secret1"));
    }

    #[tokio::test]
    async fn test_unknown_license_key_is_unauthorized() {
        let (auth, _, _) = setup();
        assert!(matches!(
            auth.sign_in("no-such-license", "secret").await,
            Err(TurnkeyError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_lost_pin_race_compares_against_winner() {
        let (auth, store, _) = setup();
        let alice = auth.sign_up("Alice").await.unwrap();
        let stale = store.find_credential(&alice.uid).await.unwrap().unwrap();

        // Another sign-in pins first, after this one read the record
        assert!(store.pin_hash(&alice.uid, "winner").await.unwrap());

        assert!(matches!(
            auth.check_auth_key(&stale, "loser").await,
            Err(TurnkeyError::Unauthorized)
        ));
        assert_ok!(auth.check_auth_key(&stale, "winner").await);
    }

    #[tokio::test]
    async fn test_token_lists_licensed_services() {
        let (auth, store, codec) = setup();
        let alice = auth.sign_up("Alice").await.unwrap();

        for service in ["svcA", "svcB"] {
            store
                .upsert_license(License {
                    uid: alice.uid.clone(),
                    service: service.into(),
                    expires_at: None,
                })
                .await
                .unwrap();
        }

        let token = auth.sign_in(&alice.uid, "secret1").await.unwrap();
        let claims = codec.decode(&token).unwrap();

        let mut services = claims.services.clone();
        services.sort();
        assert_eq!(services, vec!["svcA".to_string(), "svcB".to_string()]);
        assert_eq!(claims.sub, alice.uid);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, crate::auth::jwt::ACCESS_TOKEN_LIFETIME_MS);
    }

    #[tokio::test]
    async fn test_verify_resolves_identity() {
        let (auth, _, _) = setup();
        let alice = auth.sign_up("Alice").await.unwrap();
        let token = auth.sign_in(&alice.uid, "secret1").await.unwrap();

        assert_eq!(auth.verify(&token).await.unwrap(), alice);
        assert!(matches!(
            auth.verify("garbage").await,
            Err(TurnkeyError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_vanished_subject() {
        let (auth, _, codec) = setup();
        let now = clock::to_millis(clock::utcnow());
        let token = codec
            .encode(&AccessClaims::access("ghost".into(), vec![], now))
            .unwrap();

        assert!(matches!(
            auth.verify(&token).await,
            Err(TurnkeyError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_refresh_tokens() {
        let (auth, _, codec) = setup();
        let alice = auth.sign_up("Alice").await.unwrap();
        let now = clock::to_millis(clock::utcnow());

        let mut claims = AccessClaims::access(alice.uid, vec![], now);
        claims.token_type = TokenType::Refresh;
        let token = codec.encode(&claims).unwrap();

        assert!(matches!(
            auth.verify(&token).await,
            Err(TurnkeyError::Unauthorized)
        ));
    }
}
