//! Periodic cleanup of dead agent tokens.
//!
//! Expired and revoked tokens already fail validation; this task only keeps
//! the table from growing without bound.

use std::time::Duration;

use chrono::Utc;
use outpost_db::repositories::AgentTokenRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Dead tokens are retained this long before deletion.
const RETENTION_HOURS: i64 = 24;

/// How often the cleanup runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the token sweeper loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        retention_hours = RETENTION_HOURS,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Token sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(RETENTION_HOURS);
                match AgentTokenRepo::delete_dead_before(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Token sweeper: purged dead tokens");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Token sweeper: cleanup failed");
                    }
                }
            }
        }
    }
}
