//! Risk scoring arithmetic and the execution-permission verdict.
//!
//! Pure functions over primitive inputs. The API layer feeds these from the
//! account and violation tables; nothing here touches storage, so the policy
//! is unit-testable without a database.

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

/// Window of unresolved violations considered by the score, in days.
pub const VIOLATION_WINDOW_DAYS: i64 = 7;

/// Additional score weight applied while the account is SUSPENDED.
pub const SUSPENDED_PENALTY: f64 = 0.5;

/// Additional score weight applied while the account is DEGRADED.
pub const DEGRADED_PENALTY: f64 = 0.2;

/// Per-violation score contribution by severity name.
///
/// Severity names match the `violation_severity` database enum; the mapping
/// is duplicated here so `core` keeps zero internal deps.
pub fn severity_weight(severity: &str) -> f64 {
    match severity {
        "LOW" => 0.1,
        "MEDIUM" => 0.3,
        "HIGH" => 0.6,
        "CRITICAL" => 1.0,
        _ => 0.0,
    }
}

/// Score penalty contributed by the account's health status.
pub fn health_penalty(health_status: &str) -> f64 {
    match health_status {
        "SUSPENDED" => SUSPENDED_PENALTY,
        "DEGRADED" => DEGRADED_PENALTY,
        _ => 0.0,
    }
}

/// Sum violation severities and the health penalty, clamped to `[0, 1]`.
pub fn compute_score<'a>(
    violation_severities: impl IntoIterator<Item = &'a str>,
    health_status: &str,
) -> f64 {
    let total: f64 = violation_severities
        .into_iter()
        .map(severity_weight)
        .sum::<f64>()
        + health_penalty(health_status);
    total.clamp(0.0, 1.0)
}

/// Bucket a clamped score into a risk level name.
pub fn score_level(score: f64) -> &'static str {
    if score < 0.3 {
        "LOW"
    } else if score < 0.6 {
        "MEDIUM"
    } else if score < 0.8 {
        "HIGH"
    } else {
        "CRITICAL"
    }
}

// ---------------------------------------------------------------------------
// Execution verdict
// ---------------------------------------------------------------------------

/// Reason names returned with a disallowed verdict.
pub const REASON_SESSION_INVALID: &str = "SESSION_INVALID";
pub const REASON_RISK_PAUSE: &str = "RISK_PAUSE";
pub const REASON_USER_PAUSED: &str = "USER_PAUSED";

/// The `{allowed, reason}` tuple consulted by dispatch and heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: Option<&'static str>,
}

impl Verdict {
    pub fn allowed() -> Self {
        Self { allowed: true, reason: None }
    }

    pub fn denied(reason: &'static str) -> Self {
        Self { allowed: false, reason: Some(reason) }
    }
}

/// Primitive view of an account as the verdict needs it.
#[derive(Debug, Clone)]
pub struct AccountSnapshot<'a> {
    pub validation_status: &'a str,
    pub health_status: &'a str,
    pub user_paused: bool,
}

/// Evaluate whether execution is currently permitted.
///
/// Precedence: a missing or session-invalid account wins over risk state,
/// risk state wins over an explicit user pause. The caller passes the
/// latest risk level on record, if any.
pub fn evaluate(account: Option<&AccountSnapshot<'_>>, latest_risk_level: Option<&str>) -> Verdict {
    let Some(account) = account else {
        return Verdict::denied(REASON_SESSION_INVALID);
    };

    if matches!(account.validation_status, "EXPIRED" | "DISCONNECTED") {
        return Verdict::denied(REASON_SESSION_INVALID);
    }

    if account.health_status == "SUSPENDED" || latest_risk_level == Some("CRITICAL") {
        return Verdict::denied(REASON_RISK_PAUSE);
    }

    if account.user_paused {
        return Verdict::denied(REASON_USER_PAUSED);
    }

    Verdict::allowed()
}
