//! Handlers for the `/jobs` resource (control plane).
//!
//! Jobs are created by control-plane callers and executed by agents; the
//! agent-facing pull/result endpoints live in `agent_plane`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use outpost_core::error::CoreError;
use outpost_core::types::Id;

use outpost_db::models::audit::CreateAuditEntry;
use outpost_db::models::enums::ActorType;
use outpost_db::models::job::{CreateJob, Job, JobListQuery, JobParameters};
use outpost_db::repositories::{AccountRepo, JobRepo, JobResultRepo};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job and verify the caller created it.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: &Id,
    auth: &AuthUser,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: job_id.clone(),
        })?;

    if job.created_by_user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot view another user's job".into(),
        )));
    }

    Ok(job)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Validates the referenced account (which must belong to the caller) and
/// the per-type parameter schema, then persists the job in `PENDING`.
pub async fn create_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateJob>,
) -> AppResult<impl IntoResponse> {
    let account = AccountRepo::find_by_id(&state.pool, &input.account_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: input.account_id.clone(),
        })?;

    if account.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot create jobs for another user's account".into(),
        )));
    }

    JobParameters::validate(input.job_type, &input.parameters)
        .map_err(CoreError::Validation)?;

    if let Some(timeout) = input.timeout_seconds {
        if timeout <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "timeoutSeconds must be positive".into(),
            )));
        }
    }

    let job = JobRepo::create(
        &state.pool,
        &auth.user_id,
        &input,
        state.config.default_job_timeout_secs,
    )
    .await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "dispatch",
            event_type: "job_created".to_string(),
            entity_type: "Job",
            entity_id: job.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({
                "accountId": job.account_id,
                "type": job.job_type,
                "priority": job.priority,
            }),
        },
    )
    .await;

    tracing::info!(
        job_id = %job.id,
        job_type = %job.job_type,
        account_id = %job.account_id,
        "Job created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

// ---------------------------------------------------------------------------
// Read projections
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
///
/// Lists the caller's jobs, optionally filtered by account and state.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = JobRepo::list_by_user(&state.pool, &auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, &job_id, &auth).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/jobs/{id}/result
pub async fn get_job_result(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, &job_id, &auth).await?;

    let result = JobResultRepo::find_by_job(&state.pool, &job.id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "JobResult",
            id: job_id.clone(),
        })?;

    Ok(Json(DataResponse { data: result }))
}
