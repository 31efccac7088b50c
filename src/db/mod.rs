//! Persistence layer for Turnkey
//!
//! Services talk to the `store` traits; `MemoryStore` and `MongoStore` are the
//! two backends.

pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{MongoClient, MongoCollection};
pub use mongo_store::MongoStore;
pub use store::{ActionStore, CredentialStore, LicenseStore};
