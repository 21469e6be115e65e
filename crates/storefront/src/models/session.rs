//! Session-related types.
//!
//! Types stored in the session. The authenticated identity is written by the
//! platform auth service, which shares the same `PostgreSQL`-backed session
//! store; this crate only reads it.

use serde::{Deserialize, Serialize};

use tangelo_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name from the auth provider's user metadata, if any.
    pub full_name: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the shopping cart.
    pub const CART: &str = "cart";
}
