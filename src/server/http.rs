//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection. Every request runs
//! under the configured timeout.

use bytes::Bytes;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{AdminKeyValidator, TokenCodec};
use crate::config::{Args, StoreBackend};
use crate::db::{ActionStore, CredentialStore, LicenseStore, MemoryStore, MongoClient, MongoStore};
use crate::routes::{self, response::status_response, BoxBody};
use crate::services::{ActionLedger, Authenticator, LicenseLedger};
use crate::types::{Result, TurnkeyError};

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Sign-up, sign-in and bearer verification
    pub authenticator: Authenticator,
    pub licenses: LicenseLedger,
    pub actions: ActionLedger,
    /// Guard for license grants
    pub admin_keys: AdminKeyValidator,
}

impl AppState {
    /// Build state over any backend that provides every store capability
    pub fn with_store<S>(args: Args, store: Arc<S>) -> Result<Self>
    where
        S: CredentialStore + LicenseStore + ActionStore + 'static,
    {
        let secret = args
            .jwt_secret
            .as_deref()
            .ok_or_else(|| TurnkeyError::Config("JWT_SECRET is required".into()))?;
        let codec = TokenCodec::new(secret)?;

        let credentials: Arc<dyn CredentialStore> = store.clone();
        let licenses: Arc<dyn LicenseStore> = store.clone();
        let actions: Arc<dyn ActionStore> = store;

        Ok(Self {
            authenticator: Authenticator::new(codec, credentials.clone(), licenses.clone()),
            licenses: LicenseLedger::new(credentials, licenses),
            actions: ActionLedger::new(actions),
            admin_keys: AdminKeyValidator::new(args.admin_api_key.clone()),
            args,
        })
    }

    /// Build state with process-local storage
    pub fn in_memory(args: Args) -> Result<Self> {
        Self::with_store(args, Arc::new(MemoryStore::new()))
    }

    /// Build state for the configured backend, connecting to MongoDB if needed
    pub async fn connect(args: Args) -> Result<Self> {
        match args.store_backend {
            StoreBackend::Memory => {
                warn!("Using in-memory store - data is lost on restart");
                Self::in_memory(args)
            }
            StoreBackend::Mongo => {
                let mongo = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
                let store = MongoStore::new(&mongo).await?;
                info!("MongoDB store ready (database '{}')", mongo.db_name());
                Self::with_store(args, Arc::new(store))
            }
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Turnkey listening on {}", state.args.listen);

    if !state.admin_keys.is_configured() {
        warn!("ADMIN_API_KEY not set - POST /user/license is open to any caller");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Apply the request timeout around routing
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let timeout = Duration::from_millis(state.args.request_timeout_ms);
    match tokio::time::timeout(timeout, route(state, req)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            warn!("[{}] {} {} timed out after {:?}", addr, method, path, timeout);
            Ok(status_response(StatusCode::GATEWAY_TIMEOUT, "Request timed out"))
        }
    }
}

/// Route a request to its handler
pub async fn route<B>(state: Arc<AppState>, req: Request<B>) -> Response<BoxBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(&state),

        (Method::OPTIONS, _) => routes::response::cors_preflight(),

        _ => match routes::handle_user_request(req, state).await {
            Some(response) => response,
            None => status_response(StatusCode::NOT_FOUND, "Not Found"),
        },
    }
}
