//! Configuration for Turnkey
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

use crate::auth::jwt::MIN_SECRET_LEN;

/// Turnkey - license-key authentication and per-service licensing
#[derive(Parser, Debug, Clone)]
#[command(name = "turnkey")]
#[command(about = "License-key authentication and per-service licensing API")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Persistence backend
    #[arg(long = "store", env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Mongo)]
    pub store_backend: StoreBackend,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "turnkey")]
    pub mongodb_db: String,

    /// Secret for signing and verifying access tokens (required)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Admin API key guarding license grants (optional)
    #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
    pub admin_api_key: Option<String>,

    /// Maximum recorded events per (user, service, action) per UTC day
    #[arg(long, env = "ACTION_DAILY_LIMIT")]
    pub action_daily_limit: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

/// Where credentials, licenses and actions are kept
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    /// Process-local maps; data is lost on restart
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mongo => "mongo",
            Self::Memory => "memory",
        }
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None | Some("") => return Err("JWT_SECRET is required".to_string()),
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(format!(
                    "JWT_SECRET must be at least {} characters",
                    MIN_SECRET_LEN
                ));
            }
            Some(_) => {}
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.action_daily_limit == Some(0) {
            return Err("ACTION_DAILY_LIMIT must be greater than zero when set".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["turnkey", "--jwt-secret", SECRET]);
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.store_backend, StoreBackend::Mongo);
        assert_eq!(args.request_timeout_ms, 30000);
        assert!(args.admin_api_key.is_none());
        assert!(args.action_daily_limit.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let mut args = Args::parse_from(["turnkey", "--jwt-secret", SECRET]);

        args.jwt_secret = None;
        assert_eq!(args.validate(), Err("JWT_SECRET is required".to_string()));

        args.jwt_secret = Some(String::new());
        assert_eq!(args.validate(), Err("JWT_SECRET is required".to_string()));
    }

    #[test]
    fn test_short_secret_rejected() {
        let args = Args::parse_from(["turnkey", "--jwt-secret", "short"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_memory_backend() {
        let args = Args::parse_from(["turnkey", "--jwt-secret", SECRET, "--store", "memory"]);
        assert_eq!(args.store_backend, StoreBackend::Memory);
        assert_eq!(args.store_backend.as_str(), "memory");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let args = Args::parse_from([
            "turnkey",
            "--jwt-secret",
            SECRET,
            "--action-daily-limit",
            "0",
        ]);
        assert!(args.validate().is_err());
    }
}
