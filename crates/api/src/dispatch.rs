//! Dispatcher orchestration shared by the HTTP result endpoint and the
//! stuck-job reaper.
//!
//! Both paths funnel through [`commit_result`], so a late agent result and
//! the reaper race safely: whichever commits first wins, the loser receives
//! the stored result back unchanged.

use outpost_core::types::Id;
use outpost_db::models::audit::CreateAuditEntry;
use outpost_db::models::enums::{
    AccountValidationStatus, ActorType, FailureReason, ObservedState, ResultStatus,
    ViolationSeverity,
};
use outpost_db::models::job::Job;
use outpost_db::models::job_result::JobResult;
use outpost_db::models::risk::RecordViolation;
use outpost_db::repositories::{
    AccountRepo, JobResultRepo, RateLimitRuleRepo, ViolationRepo,
};
use sqlx::PgPool;

use crate::audit;
use crate::error::AppResult;

/// Outcome of a result submission.
pub struct CommittedResult {
    pub result: JobResult,
    /// `false` for an idempotent replay of an earlier commit.
    pub created: bool,
}

/// Commit a job result and fan out its side effects.
///
/// On a fresh commit this audits the terminal transition and, for
/// `SESSION_EXPIRED` failures, reports the fact to the Account Registry
/// (session flips to `EXPIRED`) and the Risk Oracle (a violation is
/// recorded when an active rule covers the job's action type).
pub async fn commit_result(
    pool: &PgPool,
    job: &Job,
    agent_id: &Id,
    status: ResultStatus,
    failure_reason: Option<FailureReason>,
    observed_state: Option<ObservedState>,
    actor_type: ActorType,
    actor_id: Option<Id>,
) -> AppResult<CommittedResult> {
    let outcome = JobResultRepo::commit(
        pool,
        &job.id,
        agent_id,
        status,
        failure_reason,
        observed_state,
    )
    .await?;

    if !outcome.created {
        return Ok(CommittedResult { result: outcome.result, created: false });
    }

    let event_type = match status {
        ResultStatus::Success => "job_completed",
        ResultStatus::Failed => "job_failed",
        ResultStatus::Skipped => "job_skipped",
    };
    audit::emit(
        pool,
        CreateAuditEntry {
            domain: "dispatch",
            event_type: event_type.to_string(),
            entity_type: "Job",
            entity_id: job.id.clone(),
            actor_type,
            actor_id,
            payload: serde_json::json!({
                "accountId": job.account_id,
                "status": status,
                "failureReason": failure_reason,
                "observedState": observed_state,
            }),
        },
    )
    .await;

    if failure_reason == Some(FailureReason::SessionExpired) {
        report_session_expiry(pool, job).await?;
    }

    Ok(CommittedResult { result: outcome.result, created: true })
}

/// Fan-out for a `SESSION_EXPIRED` failure: the Account Registry records
/// the expired session, the Risk Oracle records a violation when an active
/// rule covers the action type.
async fn report_session_expiry(pool: &PgPool, job: &Job) -> AppResult<()> {
    let updated = AccountRepo::update_validation_status(
        pool,
        &job.account_id,
        AccountValidationStatus::Expired,
    )
    .await?;

    if updated.is_some() {
        audit::emit(
            pool,
            CreateAuditEntry {
                domain: "accounts",
                event_type: "session_expired".to_string(),
                entity_type: "Account",
                entity_id: job.account_id.clone(),
                actor_type: ActorType::System,
                actor_id: None,
                payload: serde_json::json!({ "jobId": job.id }),
            },
        )
        .await;
    }

    let rules = RateLimitRuleRepo::list_active(pool, Some(job.job_type)).await?;
    if let Some(rule) = rules.first() {
        let violation = ViolationRepo::create(
            pool,
            &RecordViolation {
                account_id: job.account_id.clone(),
                rule_id: rule.id.clone(),
                job_id: Some(job.id.clone()),
                violation_type: "SESSION_EXPIRED".to_string(),
                severity: ViolationSeverity::High,
            },
        )
        .await?;

        audit::emit(
            pool,
            CreateAuditEntry {
                domain: "risk",
                event_type: "violation_recorded".to_string(),
                entity_type: "Violation",
                entity_id: violation.id,
                actor_type: ActorType::System,
                actor_id: None,
                payload: serde_json::json!({
                    "accountId": job.account_id,
                    "jobId": job.id,
                    "severity": violation.severity,
                }),
            },
        )
        .await;
    }

    Ok(())
}
