//! Risk Oracle: the single authority on whether execution is permitted.
//!
//! The oracle has veto-only power. It reads account state and the latest
//! risk score at call time (no cache) and never mutates jobs; dispatch and
//! heartbeat observe the verdict and stop issuing work.

use outpost_core::error::CoreError;
use outpost_core::risk::{self, AccountSnapshot, Verdict};
use outpost_core::types::Id;
use outpost_db::models::enums::RiskLevel;
use outpost_db::models::risk::RiskScore;
use outpost_db::repositories::{AccountRepo, RiskScoreRepo, ViolationRepo};
use sqlx::PgPool;

use crate::error::AppResult;

/// Stateless facade over the risk tables and the pure scoring policy.
pub struct RiskOracle;

impl RiskOracle {
    /// The critical predicate: is execution currently permitted for this
    /// account, and if not, why.
    ///
    /// Reads the account row and latest score fresh on every call; a
    /// heartbeat or pull issued after any state change observes the new
    /// verdict.
    pub async fn is_execution_allowed(
        pool: &PgPool,
        account_id: &Id,
    ) -> Result<Verdict, sqlx::Error> {
        let account = AccountRepo::find_by_id(pool, account_id).await?;
        let latest = RiskScoreRepo::latest(pool, account_id).await?;

        let snapshot = account.as_ref().map(|a| AccountSnapshot {
            validation_status: a.validation_status.as_str(),
            health_status: a.health_status.as_str(),
            user_paused: a.user_paused,
        });

        Ok(risk::evaluate(
            snapshot.as_ref(),
            latest.as_ref().map(|s| s.level.as_str()),
        ))
    }

    /// Recompute and persist the account's risk score.
    ///
    /// The score is a pure function of unresolved violations within the
    /// rolling window and the account's health status; the computed row is
    /// appended to the history and returned.
    pub async fn calculate_risk_score(pool: &PgPool, account_id: &Id) -> AppResult<RiskScore> {
        let account = AccountRepo::find_by_id(pool, account_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Account",
                id: account_id.clone(),
            })?;

        let cutoff = chrono::Utc::now() - chrono::Duration::days(risk::VIOLATION_WINDOW_DAYS);
        let severities =
            ViolationRepo::unresolved_severities_since(pool, account_id, cutoff).await?;

        let score = risk::compute_score(
            severities.iter().map(|s| s.as_str()),
            account.health_status.as_str(),
        );
        let level = level_from_name(risk::score_level(score));

        let factors = serde_json::json!({
            "unresolvedViolations": severities.len(),
            "healthStatus": account.health_status,
            "windowDays": risk::VIOLATION_WINDOW_DAYS,
        });

        let row = RiskScoreRepo::insert(pool, account_id, score, level, factors).await?;
        Ok(row)
    }
}

fn level_from_name(name: &str) -> RiskLevel {
    match name {
        "LOW" => RiskLevel::Low,
        "MEDIUM" => RiskLevel::Medium,
        "HIGH" => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}
