//! Repository for the `job_results` table.
//!
//! Result insertion and the job's terminal-state transition share one
//! transaction: a result row existing implies the job is terminal. The
//! commit is idempotent -- a duplicate submission returns the stored row
//! untouched.

use outpost_core::dispatch::state_machine;
use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::enums::{FailureReason, JobState, ObservedState, ResultStatus};
use crate::models::job::Job;
use crate::models::job_result::JobResult;

use super::job_repo;

const COLUMNS: &str = "\
    id, job_id, agent_id, status, observed_state, failure_reason, completed_at";

/// Terminal job state implied by a submitted result status.
fn terminal_state(status: ResultStatus) -> JobState {
    match status {
        ResultStatus::Success => JobState::Completed,
        ResultStatus::Failed => JobState::Failed,
        ResultStatus::Skipped => JobState::Skipped,
    }
}

/// Outcome of a commit attempt.
#[derive(Debug)]
pub struct CommitOutcome {
    pub result: JobResult,
    /// `false` when an identical commit already existed (idempotent replay).
    pub created: bool,
}

/// Provides the atomic result-commit operation and result lookups.
pub struct JobResultRepo;

impl JobResultRepo {
    /// Find the result for a job, if one has been committed.
    pub async fn find_by_job(pool: &PgPool, job_id: &Id) -> Result<Option<JobResult>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_results WHERE job_id = $1");
        sqlx::query_as::<_, JobResult>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Commit a result: insert the row and finalise the job atomically.
    ///
    /// Locks the job row first, so concurrent submissions (and the reaper)
    /// serialize here; whoever wins writes the result, everyone else gets
    /// the stored row back with `created = false`. An illegal job state is
    /// reported as `sqlx::Error::Protocol` for the caller to map.
    pub async fn commit(
        pool: &PgPool,
        job_id: &Id,
        agent_id: &Id,
        status: ResultStatus,
        failure_reason: Option<FailureReason>,
        observed_state: Option<ObservedState>,
    ) -> Result<CommitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let job_query = format!(
            "SELECT {} FROM jobs WHERE id = $1 FOR UPDATE",
            job_repo::COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&job_query)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let existing_query = format!("SELECT {COLUMNS} FROM job_results WHERE job_id = $1");
        if let Some(existing) = sqlx::query_as::<_, JobResult>(&existing_query)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
        {
            tx.commit().await?;
            return Ok(CommitOutcome { result: existing, created: false });
        }

        let to_state = terminal_state(status);
        state_machine::validate_transition(job.state.as_str(), to_state.as_str())
            .map_err(sqlx::Error::Protocol)?;

        let insert_query = format!(
            "INSERT INTO job_results (id, job_id, agent_id, status, observed_state, failure_reason) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        let result = sqlx::query_as::<_, JobResult>(&insert_query)
            .bind(new_id())
            .bind(job_id)
            .bind(agent_id)
            .bind(status)
            .bind(observed_state)
            .bind(failure_reason)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE jobs SET state = $2, failure_reason = $3, completed_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(to_state)
        .bind(failure_reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CommitOutcome { result, created: true })
    }
}
