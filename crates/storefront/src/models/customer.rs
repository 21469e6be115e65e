//! Customer profile models.
//!
//! A customer profile holds the contact details used to prefill the checkout
//! form. There is at most one profile per user identity, enforced by a
//! unique index on `user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tangelo_core::{CustomerId, UserId};

/// A persisted customer profile row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a customer profile, seeded from session metadata.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}
