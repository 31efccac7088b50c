//! HTTP routes for Turnkey

pub mod health;
pub mod response;
pub mod user;

pub use health::health_check;
pub use response::BoxBody;
pub use user::handle_user_request;
