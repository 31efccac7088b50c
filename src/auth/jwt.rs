//! Access token encoding and verification
//!
//! Tokens are compact JWTs signed with HS256 (HMAC-SHA256). `iat` and `exp`
//! are millisecond Unix timestamps, so the library's own expiry check (which
//! works in seconds) is disabled and expiry is enforced here instead.
//!
//! Every rejection (malformed token, bad signature, expired) surfaces as
//! [`TurnkeyError::Unauthorized`]; the concrete reason is only logged.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock;
use crate::types::{Result, TurnkeyError};

/// Fixed access token lifetime (24 hours) in milliseconds
pub const ACCESS_TOKEN_LIFETIME_MS: i64 = 24 * 60 * 60 * 1000;

/// Minimum accepted signing secret length
pub const MIN_SECRET_LEN: usize = 32;

/// Kind of token carried in the `tty` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Payload stored in an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Identity uid
    pub sub: String,
    /// Issued at (Unix milliseconds)
    pub iat: i64,
    /// Expiration time (Unix milliseconds)
    pub exp: i64,
    #[serde(rename = "tty")]
    pub token_type: TokenType,
    /// Services the subject held a license for at issuance
    #[serde(rename = "svc")]
    pub services: Vec<String>,
}

impl AccessClaims {
    /// Claims for a fresh access token issued at `now_ms`
    pub fn access(sub: String, services: Vec<String>, now_ms: i64) -> Self {
        Self {
            sub,
            iat: now_ms,
            exp: now_ms + ACCESS_TOKEN_LIFETIME_MS,
            token_type: TokenType::Access,
            services,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.exp <= now_ms
    }
}

/// Signs and verifies access tokens with a single shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the configured secret
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(TurnkeyError::Config("JWT_SECRET is required".into()));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(TurnkeyError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign claims into a compact token string
    pub fn encode(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TurnkeyError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the claims
    pub fn decode(&self, token: &str) -> Result<AccessClaims> {
        self.decode_at(token, clock::to_millis(clock::utcnow()))
    }

    /// [`decode`](Self::decode) against an explicit "now"
    pub fn decode_at(&self, token: &str, now_ms: i64) -> Result<AccessClaims> {
        let claims = match decode::<AccessClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(err) => {
                debug!("Token rejected: {:?}", err.kind());
                return Err(TurnkeyError::Unauthorized);
            }
        };

        if claims.is_expired_at(now_ms) {
            debug!("Token rejected: expired at {}", claims.exp);
            return Err(TurnkeyError::Unauthorized);
        }

        Ok(claims)
    }
}

/// Extract token from an Authorization header value.
/// Only the "Bearer <token>" scheme is accepted; the scheme name is
/// case-insensitive.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let (scheme, token) = auth_header?.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn test_codec() -> TokenCodec {
        TokenCodec::new(SECRET).unwrap()
    }

    fn fresh_claims() -> AccessClaims {
        let now = clock::to_millis(clock::utcnow());
        AccessClaims::access("uid-123".into(), vec!["svcA".into(), "svcB".into()], now)
    }

    #[test]
    fn test_encode_and_decode_round_trip() {
        let codec = test_codec();
        let claims = fresh_claims();

        let token = codec.encode(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = test_codec();
        let claims = fresh_claims();
        assert_eq!(codec.encode(&claims).unwrap(), codec.encode(&claims).unwrap());
    }

    #[test]
    fn test_lifetime_is_one_day() {
        let claims = AccessClaims::access("uid".into(), vec![], 1_000);
        assert_eq!(claims.exp - claims.iat, 86_400_000);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_wire_claim_names() {
        let claims = AccessClaims::access("uid".into(), vec!["svcA".into()], 5);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["tty"], "access");
        assert_eq!(json["svc"][0], "svcA");
        assert_eq!(json["iat"], 5);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = test_codec();
        let now = clock::to_millis(clock::utcnow());
        let mut claims = AccessClaims::access("uid-123".into(), vec![], now - 2 * ACCESS_TOKEN_LIFETIME_MS);
        assert!(claims.exp < now);

        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(TurnkeyError::Unauthorized)));

        // Boundary: exp == now is already expired
        claims.exp = now;
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(
            codec.decode_at(&token, now),
            Err(TurnkeyError::Unauthorized)
        ));
        assert!(codec.decode_at(&token, now - 1).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = test_codec();
        let token = codec.encode(&fresh_claims()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let forged = String::from_utf8(payload)
            .unwrap()
            .replace("uid-123", "uid-999");
        let forged_token = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged.as_bytes()),
            parts[2]
        );

        assert!(matches!(
            codec.decode(&forged_token),
            Err(TurnkeyError::Unauthorized)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = test_codec();
        let token = codec.encode(&fresh_claims()).unwrap();

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 2;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(codec.decode(&tampered), Err(TurnkeyError::Unauthorized)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = test_codec();
        let other = TokenCodec::new("different-secret-that-is-at-least-32-characters").unwrap();

        let token = codec.encode(&fresh_claims()).unwrap();
        assert!(matches!(other.decode(&token), Err(TurnkeyError::Unauthorized)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = test_codec();
        for token in ["", "invalid-token", "a.b.c", "..."] {
            assert!(matches!(codec.decode(token), Err(TurnkeyError::Unauthorized)));
        }
    }

    #[test]
    fn test_secret_validation() {
        assert!(TokenCodec::new("").is_err());
        assert!(TokenCodec::new("short").is_err());
        assert!(TokenCodec::new("this-secret-is-at-least-32-chars-long").is_ok());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            extract_token_from_header(Some("Bearer abc123")),
            Some("abc123")
        );

        assert_eq!(extract_token_from_header(None), None);
        assert_eq!(extract_token_from_header(Some("")), None);
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(Some("abc123")), None);
        assert_eq!(extract_token_from_header(Some("Basic abc123")), None);
        assert_eq!(extract_token_from_header(Some("Bearerabc123")), None);
        assert_eq!(extract_token_from_header(Some("Bearer abc 123")), None);
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_token_from_header(Some("bearer abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(Some("BEARER abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(Some("bEaReR  abc123 ")), Some("abc123"));
    }
}
