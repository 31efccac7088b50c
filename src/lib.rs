//! Turnkey - license-key authentication and per-service licensing
//!
//! Users sign up for an identity, sign in by presenting their license key
//! together with an auth key that is pinned on first use, and receive a
//! signed access token listing their licensed services. Authenticated users
//! record and query per-service actions for the current UTC day.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, TurnkeyError};
