//! Admin API key check for license management
//!
//! The key is passed via the X-API-Key header. When no key is configured the
//! license route is left open.

/// Header carrying the admin key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validator for the optional admin API key
#[derive(Debug, Clone)]
pub struct AdminKeyValidator {
    admin_key: Option<String>,
}

impl AdminKeyValidator {
    /// Create a new validator; an empty key counts as unconfigured
    pub fn new(admin_key: Option<String>) -> Self {
        Self {
            admin_key: admin_key.filter(|k| !k.is_empty()),
        }
    }

    /// Check if admin key authentication is configured
    pub fn is_configured(&self) -> bool {
        self.admin_key.is_some()
    }

    /// Whether a request presenting `api_key` may manage licenses
    pub fn allows(&self, api_key: Option<&str>) -> bool {
        match (&self.admin_key, api_key) {
            (None, _) => true,
            (Some(expected), Some(key)) => constant_time_compare(key, expected),
            (Some(_), None) => false,
        }
    }
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_allows_everything() {
        let validator = AdminKeyValidator::new(None);
        assert!(!validator.is_configured());
        assert!(validator.allows(None));
        assert!(validator.allows(Some("anything")));
    }

    #[test]
    fn test_admin_key_validation() {
        let validator = AdminKeyValidator::new(Some("admin-secret".into()));
        assert!(validator.is_configured());

        assert!(validator.allows(Some("admin-secret")));
        assert!(!validator.allows(Some("wrong-key")));
        assert!(!validator.allows(None));
    }

    #[test]
    fn test_empty_key_treated_as_none() {
        let validator = AdminKeyValidator::new(Some("".into()));
        assert!(!validator.is_configured());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hell", "hello"));
        assert!(constant_time_compare("", ""));
    }
}
