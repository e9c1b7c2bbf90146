//! Risk oracle entity models and DTOs: rules, violations, score history.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::{JobType, RiskLevel, ViolationSeverity};

/// A row from the `rate_limit_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRule {
    pub id: Id,
    pub action_type: JobType,
    pub max_count: i32,
    pub window_seconds: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/risk/rules`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRule {
    pub action_type: JobType,
    pub max_count: i32,
    pub window_seconds: i32,
}

/// A row from the `violations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: Id,
    pub account_id: Id,
    pub rule_id: Id,
    pub job_id: Option<Id>,
    pub violation_type: String,
    pub severity: ViolationSeverity,
    pub detected_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// DTO for `POST /api/v1/risk/violations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViolation {
    pub account_id: Id,
    pub rule_id: Id,
    pub job_id: Option<Id>,
    pub violation_type: String,
    pub severity: ViolationSeverity,
}

/// A row from the `risk_scores` table. Append-only history; the latest row
/// per account is authoritative.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub id: Id,
    pub account_id: Id,
    pub score: f64,
    pub level: RiskLevel,
    /// Opaque diagnostic breakdown of what contributed to the score.
    pub factors: serde_json::Value,
    pub calculated_at: Timestamp,
}

/// DTO for `POST /api/v1/risk/acknowledge`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeViolation {
    pub violation_id: Id,
}
