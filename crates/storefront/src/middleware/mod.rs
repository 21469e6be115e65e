//! Middleware for the storefront.

pub mod auth;
pub mod session;

pub use auth::OptionalAuth;
pub use session::create_session_layer;
