//! HTTP server and shared application state

pub mod http;

pub use http::{route, run, AppState};
