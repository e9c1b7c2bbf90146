//! Repository for the `rate_limit_rules` table.

use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::enums::JobType;
use crate::models::risk::{CreateRule, RateLimitRule};

const COLUMNS: &str = "id, action_type, max_count, window_seconds, is_active, created_at";

/// Provides CRUD operations for rate-limit rules.
pub struct RateLimitRuleRepo;

impl RateLimitRuleRepo {
    /// Create an active rule.
    pub async fn create(pool: &PgPool, input: &CreateRule) -> Result<RateLimitRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO rate_limit_rules (id, action_type, max_count, window_seconds) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RateLimitRule>(&query)
            .bind(new_id())
            .bind(input.action_type)
            .bind(input.max_count)
            .bind(input.window_seconds)
            .fetch_one(pool)
            .await
    }

    /// Find a rule by id.
    pub async fn find_by_id(pool: &PgPool, id: &Id) -> Result<Option<RateLimitRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rate_limit_rules WHERE id = $1");
        sqlx::query_as::<_, RateLimitRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active rules, optionally restricted to one action type.
    pub async fn list_active(
        pool: &PgPool,
        action_type: Option<JobType>,
    ) -> Result<Vec<RateLimitRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rate_limit_rules \
             WHERE is_active AND ($1::job_type IS NULL OR action_type = $1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, RateLimitRule>(&query)
            .bind(action_type)
            .fetch_all(pool)
            .await
    }
}
