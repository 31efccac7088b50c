//! Response and request-body helpers shared by the HTTP routes

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::types::TurnkeyError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest accepted JSON request body
pub const MAX_BODY_BYTES: usize = 10240;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    add_cors_headers(headers);
    response
}

/// Render an error, logging server-side detail that the client never sees
pub fn error_response(err: TurnkeyError) -> Response<BoxBody> {
    match &err {
        TurnkeyError::Database(_) | TurnkeyError::Config(_) | TurnkeyError::Internal(_) => {
            error!("Request failed: {}", err)
        }
        TurnkeyError::TooManyRequests | TurnkeyError::BadRequest(_) => {
            warn!("Request rejected: {}", err)
        }
        TurnkeyError::Unauthorized | TurnkeyError::NotFound => {}
    }

    let code = err.code();
    let (status, message) = err.into_status_code_and_body();
    json_response(
        status,
        &ErrorResponse {
            error: message,
            code: Some(code.to_string()),
        },
    )
}

/// Plain JSON error for routing failures (404, 405, 504)
pub fn status_response(status: StatusCode, message: &str) -> Response<BoxBody> {
    json_response(
        status,
        &ErrorResponse {
            error: message.to_string(),
            code: None,
        },
    )
}

pub fn cors_preflight() -> Response<BoxBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    add_cors_headers(headers);
    headers.insert(
        "Access-Control-Max-Age",
        hyper::header::HeaderValue::from_static("86400"),
    );
    response
}

fn add_cors_headers(headers: &mut hyper::HeaderMap) {
    use hyper::header::HeaderValue;

    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization, X-API-Key"),
    );
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    full_body(Bytes::new())
}

/// Read the request body, refusing anything over [`MAX_BODY_BYTES`]
pub async fn read_body<B>(req: Request<B>) -> Result<Bytes, TurnkeyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| TurnkeyError::BadRequest(format!("Failed to read body: {}", e)))
}

pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T, TurnkeyError>
where
    T: for<'de> Deserialize<'de>,
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = read_body(req).await?;
    serde_json::from_slice(&bytes).map_err(|e| TurnkeyError::BadRequest(format!("Invalid JSON: {}", e)))
}
