//! Health check endpoint
//!
//! Liveness only: returns 200 while the process is serving requests.

use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::routes::response::{json_response, BoxBody};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    /// Active store backend
    pub store: String,
    pub timestamp: String,
}

/// Handle /health and /healthz
pub fn health_check(state: &AppState) -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: state.args.store_backend.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}
