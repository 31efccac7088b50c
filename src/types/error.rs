//! Error types for Turnkey
//!
//! Authentication failures collapse into a single `Unauthorized` kind with no
//! detail attached, so callers cannot tell a forged token from an expired one
//! or an unknown license key from a wrong auth key.

use hyper::StatusCode;

/// Main error type for Turnkey operations
#[derive(Debug, thiserror::Error)]
pub enum TurnkeyError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not Found")]
    NotFound,

    #[error("Too Many Requests")]
    TooManyRequests,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TurnkeyError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Database(_) => "DB_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to an API client.
    ///
    /// Storage and internal failures are reported generically; their detail
    /// only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(_) | Self::Unauthorized | Self::NotFound | Self::TooManyRequests => {
                self.to_string()
            }
            Self::Database(_) => "Service Unavailable".to_string(),
            Self::Config(_) | Self::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        (self.status_code(), self.public_message())
    }
}

impl From<std::io::Error> for TurnkeyError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for Turnkey operations
pub type Result<T> = std::result::Result<T, TurnkeyError>;
