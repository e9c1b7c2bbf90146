//! Job entity model, DTOs, and per-type parameter validation.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::{FailureReason, JobState, JobType};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Id,
    pub account_id: Id,
    pub created_by_user_id: Id,
    pub assigned_agent_id: Option<Id>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub parameters: serde_json::Value,
    pub state: JobState,
    /// Higher dispatches first.
    pub priority: i32,
    pub earliest_execution_time: Timestamp,
    pub timeout_seconds: i32,
    pub failure_reason: Option<FailureReason>,
    pub created_at: Timestamp,
    pub assigned_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// DTO for `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    pub account_id: Id,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub parameters: serde_json::Value,
    pub priority: Option<i32>,
    pub earliest_execution_time: Option<Timestamp>,
    pub timeout_seconds: Option<i32>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub account_id: Option<Id>,
    pub state: Option<JobState>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// The shape a job takes on the wire when handed to an agent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedJob {
    pub job_id: Id,
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Application-level lead reference carried inside the parameters map,
    /// surfaced for the agent's convenience when present.
    pub lead_id: Option<String>,
    pub payload: serde_json::Value,
    pub earliest_execution_time: Timestamp,
    pub timeout_seconds: i32,
}

impl From<Job> for AssignedJob {
    fn from(job: Job) -> Self {
        let lead_id = job
            .parameters
            .get("leadId")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self {
            job_id: job.id,
            job_type: job.job_type,
            lead_id,
            payload: job.parameters,
            earliest_execution_time: job.earliest_execution_time,
            timeout_seconds: job.timeout_seconds,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed parameters
// ---------------------------------------------------------------------------

/// Typed view of `Job.parameters`, validated per job type at creation.
///
/// The stored column stays an opaque JSONB map (extra keys such as `leadId`
/// are application-level and pass through untouched); this enum only proves
/// the required keys are present and well-formed.
#[derive(Debug, Clone)]
pub enum JobParameters {
    VisitProfile {
        profile_url: String,
    },
    SendConnectionRequest {
        profile_url: String,
        note_text: Option<String>,
    },
    LikePost {
        post_url: String,
    },
    CommentPost {
        post_url: String,
        message_text: String,
    },
    SendMessage {
        profile_url: String,
        message_text: String,
    },
}

impl JobParameters {
    /// Validate a raw parameters map against the job type's schema.
    pub fn validate(job_type: JobType, raw: &serde_json::Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            profile_url: Option<String>,
            post_url: Option<String>,
            note_text: Option<String>,
            message_text: Option<String>,
        }

        if !raw.is_object() {
            return Err("parameters must be a JSON object".to_string());
        }
        let fields: Raw = serde_json::from_value(raw.clone())
            .map_err(|e| format!("malformed parameters: {e}"))?;

        let require = |field: Option<String>, name: &str| {
            field
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("parameters.{name} is required for {job_type}"))
        };

        match job_type {
            JobType::VisitProfile => Ok(Self::VisitProfile {
                profile_url: require(fields.profile_url, "profileUrl")?,
            }),
            JobType::SendConnectionRequest => Ok(Self::SendConnectionRequest {
                profile_url: require(fields.profile_url, "profileUrl")?,
                note_text: fields.note_text,
            }),
            JobType::LikePost => Ok(Self::LikePost {
                post_url: require(fields.post_url, "postUrl")?,
            }),
            JobType::CommentPost => Ok(Self::CommentPost {
                post_url: require(fields.post_url, "postUrl")?,
                message_text: require(fields.message_text, "messageText")?,
            }),
            JobType::SendMessage => Ok(Self::SendMessage {
                profile_url: require(fields.profile_url, "profileUrl")?,
                message_text: require(fields.message_text, "messageText")?,
            }),
        }
    }
}
