//! Shared types for Turnkey

pub mod error;
pub mod models;

pub use error::{Result, TurnkeyError};
pub use models::{ActionEvent, CredentialRecord, Identity, License};
