//! Repository for the `risk_scores` table (append-only history).

use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::enums::RiskLevel;
use crate::models::risk::RiskScore;

const COLUMNS: &str = "id, account_id, score, level, factors, calculated_at";

/// Provides insert and latest-row lookups for risk scores.
pub struct RiskScoreRepo;

impl RiskScoreRepo {
    /// Append a computed score to the account's history.
    pub async fn insert(
        pool: &PgPool,
        account_id: &Id,
        score: f64,
        level: RiskLevel,
        factors: serde_json::Value,
    ) -> Result<RiskScore, sqlx::Error> {
        let query = format!(
            "INSERT INTO risk_scores (id, account_id, score, level, factors) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RiskScore>(&query)
            .bind(new_id())
            .bind(account_id)
            .bind(score)
            .bind(level)
            .bind(factors)
            .fetch_one(pool)
            .await
    }

    /// The authoritative (latest) score for an account, if any exists.
    pub async fn latest(pool: &PgPool, account_id: &Id) -> Result<Option<RiskScore>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risk_scores \
             WHERE account_id = $1 ORDER BY calculated_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, RiskScore>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }
}
