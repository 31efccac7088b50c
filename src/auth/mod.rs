//! Authentication primitives for Turnkey
//!
//! Provides:
//! - Access token signing and verification (HS256, millisecond expiry)
//! - Bearer token extraction
//! - Constant-time secret comparison and the admin API key check

pub mod api_key;
pub mod jwt;

pub use api_key::{constant_time_compare, AdminKeyValidator, API_KEY_HEADER};
pub use jwt::{extract_token_from_header, AccessClaims, TokenCodec, TokenType};
