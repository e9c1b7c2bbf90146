//! Job result entity model and DTOs.
//!
//! A result row is the commit point of an execution: its insertion and the
//! job's terminal-state transition are a single atomic action, and at most
//! one result exists per job.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::{FailureReason, ObservedState, ResultStatus};

/// A row from the `job_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub id: Id,
    pub job_id: Id,
    pub agent_id: Id,
    pub status: ResultStatus,
    pub observed_state: Option<ObservedState>,
    pub failure_reason: Option<FailureReason>,
    pub completed_at: Timestamp,
}

/// DTO for `POST /agent/jobs/{jobId}/result`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub status: ResultStatus,
    pub failure_reason: Option<FailureReason>,
    pub metadata: Option<SubmitResultMetadata>,
}

/// Factual observations reported alongside the outcome.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultMetadata {
    pub observed_state: Option<ObservedState>,
}
