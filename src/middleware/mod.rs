//! Middleware for the loan API
//!
//! Request tracing and bearer-token authentication.

pub mod auth;
mod tracing;

pub use auth::AuthenticatedUser;
pub use self::tracing::request_tracing;
