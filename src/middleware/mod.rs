//! Middleware module
//!
//! Request-level concerns shared by the HTTP handlers.

pub mod auth;

pub use auth::AuthClaims;
