//! Repository for the `accounts` table.
//!
//! The Account Registry is the sole writer of account rows. At most one
//! account exists per user, enforced by `uq_accounts_user_id`.

use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount};
use crate::models::enums::{AccountHealthStatus, AccountValidationStatus};

const COLUMNS: &str = "\
    id, user_id, profile_url, display_name, validation_status, health_status, \
    user_paused, session_valid_at, metadata, created_at, updated_at";

/// Provides CRUD operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Create an account for a user. Fails with a unique violation on
    /// `uq_accounts_user_id` if the user already has one.
    pub async fn create(
        pool: &PgPool,
        user_id: &Id,
        input: &CreateAccount,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (id, user_id, profile_url, display_name, metadata) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(new_id())
            .bind(user_id)
            .bind(&input.profile_url)
            .bind(&input.display_name)
            .bind(
                input
                    .metadata
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({})),
            )
            .fetch_one(pool)
            .await
    }

    /// Find an account by id.
    pub async fn find_by_id(pool: &PgPool, id: &Id) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the account bound to a user.
    pub async fn find_by_user(pool: &PgPool, user_id: &Id) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE user_id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update the session-validity status.
    pub async fn update_validation_status(
        pool: &PgPool,
        id: &Id,
        status: AccountValidationStatus,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET validation_status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Update the health status.
    pub async fn update_health_status(
        pool: &PgPool,
        id: &Id,
        status: AccountHealthStatus,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET health_status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Record an externally-observed valid session: stamps
    /// `session_valid_at` and flips the validation status back to CONNECTED.
    pub async fn mark_session_valid(pool: &PgPool, id: &Id) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET session_valid_at = NOW(), validation_status = $2, \
             updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(AccountValidationStatus::Connected)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the explicit user pause flag.
    pub async fn set_user_paused(
        pool: &PgPool,
        id: &Id,
        paused: bool,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET user_paused = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(paused)
            .fetch_optional(pool)
            .await
    }
}
