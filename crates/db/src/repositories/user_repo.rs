//! Repository for the `users` table.

use outpost_core::types::new_id;
use sqlx::PgPool;

use crate::models::user::User;

const COLUMNS: &str = "id, email, created_at";

/// Provides lookups and identity-integration provisioning for users.
pub struct UserRepo;

impl UserRepo {
    /// Resolve an externally-authenticated principal to an internal user,
    /// provisioning the row on first sight.
    pub async fn find_or_create_by_email(pool: &PgPool, email: &str) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email) VALUES ($1, $2) \
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(new_id())
            .bind(email)
            .fetch_one(pool)
            .await
    }
}
