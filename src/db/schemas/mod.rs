//! Database schemas for Turnkey
//!
//! Defines MongoDB document structures for credentials, licenses and actions.

mod action;
mod credential;
mod license;
mod metadata;

pub use action::{ActionDoc, ACTION_COLLECTION};
pub use credential::{CredentialDoc, CREDENTIAL_COLLECTION};
pub use license::{LicenseDoc, LICENSE_COLLECTION};
pub use metadata::Metadata;
