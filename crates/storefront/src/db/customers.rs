//! Customer repository for database operations.
//!
//! Profiles are keyed by `user_id` with a unique index. Creation uses
//! `ON CONFLICT DO NOTHING` so that two concurrent first-checkout requests
//! for the same user can never produce duplicate rows; the loser of the
//! race reads back the winner's row.

use sqlx::PgPool;

use tangelo_core::UserId;

use super::RepositoryError;
use crate::models::{Customer, NewCustomer};
use crate::services::checkout::ProfileStore;

const CUSTOMER_COLUMNS: &str = "id, user_id, full_name, email, phone, created_at, updated_at";

/// Outcome of a profile creation attempt.
#[derive(Debug)]
pub enum CreateOutcome {
    /// A new row was inserted.
    Created(Customer),
    /// A row for this user already existed (possibly inserted concurrently).
    AlreadyExists(Customer),
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer profile by the owning user's ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1");
        let row = sqlx::query_as::<_, Customer>(&query)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Create a customer profile for a user.
    ///
    /// The insert is atomic with respect to the unique `user_id` index: if a
    /// profile already exists (or is inserted concurrently), no new row is
    /// written and the existing row is returned instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::NotFound` if the conflicting row vanishes
    /// between the insert and the read-back (concurrent delete).
    pub async fn create(&self, new: &NewCustomer) -> Result<CreateOutcome, RepositoryError> {
        let query = format!(
            "INSERT INTO customers (user_id, full_name, email, phone) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO NOTHING \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Customer>(&query)
            .bind(new.user_id)
            .bind(&new.full_name)
            .bind(&new.email)
            .bind(&new.phone)
            .fetch_optional(self.pool)
            .await?;

        if let Some(customer) = inserted {
            return Ok(CreateOutcome::Created(customer));
        }

        // Lost the insert race (or the row predates us): read the winner.
        match self.get_by_user_id(new.user_id).await? {
            Some(customer) => Ok(CreateOutcome::AlreadyExists(customer)),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl ProfileStore for CustomerRepository<'_> {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Customer>, RepositoryError> {
        self.get_by_user_id(user_id).await
    }

    async fn create_profile(&self, new: &NewCustomer) -> Result<CreateOutcome, RepositoryError> {
        self.create(new).await
    }
}
