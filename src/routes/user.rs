//! HTTP routes for users, licenses and actions
//!
//! - POST /user/signup                               - Create an identity
//! - POST /user/signin                               - Exchange license key + auth key for a token
//! - GET  /user                                      - Profile of the bearer
//! - POST /user/service/{service}/action/{action}    - Record an action
//! - GET  /user/service/{service}/action/{action}    - Today's actions
//! - POST /user/license                              - Grant a license (admin key if configured)

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::auth::{extract_token_from_header, API_KEY_HEADER};
use crate::routes::response::{
    error_response, json_response, parse_json_body, read_body, status_response, BoxBody,
};
use crate::server::AppState;
use crate::types::{ActionEvent, Identity, Result, TurnkeyError};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub license_key: String,
    pub auth_key: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLicenseRequest {
    pub uid: String,
    pub service: String,
    /// Days until expiry, counted from the grant
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateActionRequest {
    /// Must be a JSON object or null
    #[serde(default = "empty_object")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Default for CreateActionRequest {
    fn default() -> Self {
        Self {
            data: empty_object(),
        }
    }
}

fn empty_object() -> Option<serde_json::Map<String, serde_json::Value>> {
    Some(serde_json::Map::new())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionListResponse {
    pub count: usize,
    pub data: Vec<ActionEvent>,
}

// =============================================================================
// Guards
// =============================================================================

fn bearer_token<B>(req: &Request<B>) -> Option<String> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    extract_token_from_header(header).map(str::to_string)
}

/// Resolve a bearer token to an identity
async fn authenticate(token: Option<String>, state: &AppState) -> Result<Identity> {
    let token = token.ok_or(TurnkeyError::Unauthorized)?;
    state.authenticator.verify(&token).await
}

fn require_admin_key<B>(req: &Request<B>, state: &AppState) -> Result<()> {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if state.admin_keys.allows(key) {
        Ok(())
    } else {
        warn!("License grant rejected - bad admin key");
        Err(TurnkeyError::Unauthorized)
    }
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TurnkeyError::BadRequest(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(())
}

fn path_param(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| TurnkeyError::BadRequest("Invalid path parameter".into()))
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /user/signup
async fn handle_sign_up<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: SignUpRequest = parse_json_body(req).await?;
    required("name", &body.name)?;

    let identity = state.authenticator.sign_up(&body.name).await?;
    Ok(json_response(StatusCode::OK, &identity))
}

/// POST /user/signin
async fn handle_sign_in<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: SignInRequest = parse_json_body(req).await?;
    required("license_key", &body.license_key)?;
    required("auth_key", &body.auth_key)?;

    let access_token = state
        .authenticator
        .sign_in(&body.license_key, &body.auth_key)
        .await?;
    Ok(json_response(StatusCode::OK, &AuthResponse { access_token }))
}

/// GET /user
async fn handle_profile<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>> {
    let identity = authenticate(bearer_token(&req), &state).await?;
    Ok(json_response(
        StatusCode::OK,
        &UserResponse {
            name: identity.name,
        },
    ))
}

/// POST /user/license
async fn handle_grant_license<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    require_admin_key(&req, &state)?;

    let body: CreateLicenseRequest = parse_json_body(req).await?;
    required("uid", &body.uid)?;
    required("service", &body.service)?;

    let license = state
        .licenses
        .grant(&body.uid, &body.service, body.expires_in)
        .await?;
    Ok(json_response(StatusCode::OK, &license))
}

/// POST /user/service/{service}/action/{action}
async fn handle_record_action<B>(
    req: Request<B>,
    state: Arc<AppState>,
    service: String,
    action: String,
) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let identity = authenticate(bearer_token(&req), &state).await?;

    let bytes = read_body(req).await?;
    let body = if bytes.iter().all(u8::is_ascii_whitespace) {
        CreateActionRequest::default()
    } else {
        serde_json::from_slice::<CreateActionRequest>(&bytes)
            .map_err(|e| TurnkeyError::BadRequest(format!("Invalid JSON: {}", e)))?
    };

    if let Some(limit) = state.args.action_daily_limit {
        state
            .actions
            .ensure_within_limit(&identity.uid, &service, &action, limit)
            .await?;
    }

    let event = state
        .actions
        .record(
            &identity.uid,
            &service,
            &action,
            body.data.map(serde_json::Value::Object),
        )
        .await?;
    Ok(json_response(StatusCode::OK, &event))
}

/// GET /user/service/{service}/action/{action}
async fn handle_list_actions<B>(
    req: Request<B>,
    state: Arc<AppState>,
    service: String,
    action: String,
) -> Result<Response<BoxBody>> {
    let identity = authenticate(bearer_token(&req), &state).await?;

    let events = state
        .actions
        .query_today(&identity.uid, &service, &action)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &ActionListResponse {
            count: events.len(),
            data: events,
        },
    ))
}

// =============================================================================
// Main Router
// =============================================================================

/// Handle user-related HTTP requests.
///
/// Returns Some(response) if request was handled, None if not a /user route.
pub async fn handle_user_request<B>(req: Request<B>, state: Arc<AppState>) -> Option<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    if segments.first() != Some(&"user") {
        return None;
    }

    let method = req.method().clone();

    let result = match (&method, segments.as_slice()) {
        (&Method::GET, ["user"]) => handle_profile(req, state).await,
        (&Method::POST, ["user", "signup"]) => handle_sign_up(req, state).await,
        (&Method::POST, ["user", "signin"]) => handle_sign_in(req, state).await,
        (&Method::POST, ["user", "license"]) => handle_grant_license(req, state).await,
        (m, ["user", "service", service, "action", action])
            if m == Method::GET || m == Method::POST =>
        {
            match (path_param(service), path_param(action)) {
                (Ok(service), Ok(action)) if m == Method::GET => {
                    handle_list_actions(req, state, service, action).await
                }
                (Ok(service), Ok(action)) => handle_record_action(req, state, service, action).await,
                (Err(e), _) | (_, Err(e)) => Err(e),
            }
        }

        (_, ["user"])
        | (_, ["user", "signup"])
        | (_, ["user", "signin"])
        | (_, ["user", "license"])
        | (_, ["user", "service", _, "action", _]) => {
            return Some(status_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"))
        }

        _ => return Some(status_response(StatusCode::NOT_FOUND, "Not Found")),
    };

    Some(result.unwrap_or_else(error_response))
}
