//! Stuck-job reaper.
//!
//! Agents observe their own timeouts by contract; this task is the backstop
//! for agents that died mid-execution. Jobs stuck in `EXECUTING` past
//! `started_at + timeout_seconds + grace` are failed with `TIMEOUT` through
//! the same idempotent commit path agents use, so a late agent result wins
//! any race.

use std::time::Duration;

use outpost_core::dispatch::REAPER_GRACE_SECS;
use outpost_db::models::enums::{ActorType, FailureReason, ResultStatus};
use outpost_db::repositories::JobRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::dispatch;

/// How often the reaper scans for stuck jobs.
const SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Run the reaper loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        scan_interval_secs = SCAN_INTERVAL.as_secs(),
        grace_secs = REAPER_GRACE_SECS,
        "Job reaper started"
    );

    let mut interval = tokio::time::interval(SCAN_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job reaper stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = reap_once(&pool).await {
                    tracing::error!(error = %e, "Reaper scan failed");
                }
            }
        }
    }
}

/// One scan: time out every stuck job.
async fn reap_once(pool: &PgPool) -> Result<(), crate::error::AppError> {
    let stuck = JobRepo::find_stuck_executing(pool, REAPER_GRACE_SECS, chrono::Utc::now()).await?;

    for job in stuck {
        // An EXECUTING job always has an assignee.
        let Some(agent_id) = job.assigned_agent_id.clone() else {
            tracing::warn!(job_id = %job.id, "Executing job without assignee, skipping");
            continue;
        };

        let committed = dispatch::commit_result(
            pool,
            &job,
            &agent_id,
            ResultStatus::Failed,
            Some(FailureReason::Timeout),
            None,
            ActorType::System,
            None,
        )
        .await?;

        if committed.created {
            tracing::warn!(job_id = %job.id, agent_id = %agent_id, "Stuck job timed out");
        }
    }

    Ok(())
}
