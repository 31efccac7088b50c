//! Core services: authentication protocol, licensing and the action ledger

pub mod actions;
pub mod authenticator;
pub mod licensing;

pub use actions::ActionLedger;
pub use authenticator::Authenticator;
pub use licensing::LicenseLedger;
