//! Repository for the `violations` table.

use chrono::{DateTime, Utc};
use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::enums::ViolationSeverity;
use crate::models::risk::{RecordViolation, Violation};

const COLUMNS: &str = "\
    id, account_id, rule_id, job_id, violation_type, severity, detected_at, resolved_at";

/// Provides CRUD operations for violations.
pub struct ViolationRepo;

impl ViolationRepo {
    /// Record a violation against an account.
    pub async fn create(pool: &PgPool, input: &RecordViolation) -> Result<Violation, sqlx::Error> {
        let query = format!(
            "INSERT INTO violations (id, account_id, rule_id, job_id, violation_type, severity) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(new_id())
            .bind(&input.account_id)
            .bind(&input.rule_id)
            .bind(&input.job_id)
            .bind(&input.violation_type)
            .bind(input.severity)
            .fetch_one(pool)
            .await
    }

    /// Find a violation by id.
    pub async fn find_by_id(pool: &PgPool, id: &Id) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM violations WHERE id = $1");
        sqlx::query_as::<_, Violation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List violations for an account, newest first.
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: &Id,
        unresolved_only: bool,
    ) -> Result<Vec<Violation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM violations \
             WHERE account_id = $1 AND (NOT $2 OR resolved_at IS NULL) \
             ORDER BY detected_at DESC, id ASC"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(account_id)
            .bind(unresolved_only)
            .fetch_all(pool)
            .await
    }

    /// Severities of unresolved violations detected at or after the cutoff.
    /// Feeds the risk-score arithmetic.
    pub async fn unresolved_severities_since(
        pool: &PgPool,
        account_id: &Id,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ViolationSeverity>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT severity FROM violations \
             WHERE account_id = $1 AND resolved_at IS NULL AND detected_at >= $2",
        )
        .bind(account_id)
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Mark a violation resolved. Returns the updated row, or `None` if the
    /// violation is unknown or already resolved.
    pub async fn resolve(pool: &PgPool, id: &Id) -> Result<Option<Violation>, sqlx::Error> {
        let query = format!(
            "UPDATE violations SET resolved_at = NOW() \
             WHERE id = $1 AND resolved_at IS NULL RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
