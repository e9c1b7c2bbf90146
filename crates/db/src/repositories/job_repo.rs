//! Repository for the `jobs` table.
//!
//! All state transitions go through the dispatch state machine; the claim
//! path uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent pullers never
//! hand out the same job twice.

use chrono::{DateTime, Utc};
use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::enums::JobState;
use crate::models::job::{CreateJob, Job, JobListQuery};

/// Column list shared with the result-commit transaction.
pub(crate) const COLUMNS: &str = "\
    id, account_id, created_by_user_id, assigned_agent_id, job_type, parameters, \
    state, priority, earliest_execution_time, timeout_seconds, failure_reason, \
    created_at, assigned_at, started_at, completed_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD and dispatch operations for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Persist a new job in `PENDING` state.
    ///
    /// `earliest_execution_time` defaults to now and `priority` to 0;
    /// parameter validation happens in the handler before this call.
    pub async fn create(
        pool: &PgPool,
        created_by_user_id: &Id,
        input: &CreateJob,
        default_timeout_seconds: i32,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs \
                 (id, account_id, created_by_user_id, job_type, parameters, priority, \
                  earliest_execution_time, timeout_seconds) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(new_id())
            .bind(&input.account_id)
            .bind(created_by_user_id)
            .bind(input.job_type)
            .bind(&input.parameters)
            .bind(input.priority.unwrap_or(0))
            .bind(input.earliest_execution_time)
            .bind(input.timeout_seconds.unwrap_or(default_timeout_seconds))
            .fetch_one(pool)
            .await
    }

    /// Find a job by its id.
    pub async fn find_by_id(pool: &PgPool, id: &Id) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim up to `limit` eligible pending jobs for an agent.
    ///
    /// Eligible means `PENDING` with `earliest_execution_time <= NOW()`.
    /// Uses `FOR UPDATE SKIP LOCKED` so concurrent pullers each win a
    /// disjoint set. The returned batch is sorted by
    /// `(priority DESC, created_at ASC, id ASC)` -- `UPDATE .. RETURNING`
    /// does not guarantee row order, so the sort is reapplied here.
    pub async fn claim_batch(
        pool: &PgPool,
        account_id: &Id,
        agent_id: &Id,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET state = $1, assigned_agent_id = $2, assigned_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM jobs \
                 WHERE account_id = $3 \
                   AND state = $4 \
                   AND earliest_execution_time <= NOW() \
                 ORDER BY priority DESC, created_at ASC, id ASC \
                 LIMIT $5 \
                 FOR UPDATE SKIP LOCKED \
             ) AND state = $4 \
             RETURNING {COLUMNS}"
        );
        let mut jobs = sqlx::query_as::<_, Job>(&query)
            .bind(JobState::Assigned)
            .bind(agent_id)
            .bind(account_id)
            .bind(JobState::Pending)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        jobs.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(jobs)
    }

    /// Transition an `ASSIGNED` job to `EXECUTING` and stamp `started_at`.
    ///
    /// Returns `None` if the job is no longer in `ASSIGNED` (the CAS lost).
    pub async fn start_execution(pool: &PgPool, id: &Id) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET state = $2, started_at = NOW() \
             WHERE id = $1 AND state = $3 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobState::Executing)
            .bind(JobState::Assigned)
            .fetch_optional(pool)
            .await
    }

    /// List jobs created on behalf of a user (control-plane projection).
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &Id,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE created_by_user_id = $1 \
               AND ($2::TEXT IS NULL OR account_id = $2) \
               AND ($3::job_state IS NULL OR state = $3) \
             ORDER BY created_at DESC, id ASC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(user_id)
            .bind(&params.account_id)
            .bind(params.state)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find jobs stuck in `EXECUTING` whose own timeout plus grace has
    /// elapsed. The reaper feeds these through the idempotent commit path.
    pub async fn find_stuck_executing(
        pool: &PgPool,
        grace_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE state = $1 \
               AND started_at IS NOT NULL \
               AND started_at + make_interval(secs => timeout_seconds + $2) < $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobState::Executing)
            .bind(grace_seconds as f64)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
