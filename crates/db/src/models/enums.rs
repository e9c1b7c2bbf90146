//! Wire-visible domain enums mapping to PostgreSQL enum types.
//!
//! Each enum's wire spelling is SCREAMING_SNAKE_CASE on both the JSON and
//! database sides. `as_str` returns the wire spelling so pure policy code
//! in `outpost-core` (which is string-keyed) can consume it directly.

use serde::{Deserialize, Serialize};

macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $pg_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[sqlx(type_name = $pg_name, rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// The wire spelling of the variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_wire_enum! {
    /// Whether the account's externally-observed session is usable.
    AccountValidationStatus as "account_validation_status" {
        Connected => "CONNECTED",
        Expired => "EXPIRED",
        Disconnected => "DISCONNECTED",
    }
}

define_wire_enum! {
    /// Operational health of the account on the target platform.
    AccountHealthStatus as "account_health_status" {
        Healthy => "HEALTHY",
        Degraded => "DEGRADED",
        Suspended => "SUSPENDED",
    }
}

define_wire_enum! {
    /// Agent lifecycle state.
    AgentState as "agent_state" {
        Registered => "REGISTERED",
        Idle => "IDLE",
        Active => "ACTIVE",
        Terminated => "TERMINATED",
    }
}

define_wire_enum! {
    /// The unit of dispatched work.
    JobType as "job_type" {
        VisitProfile => "VISIT_PROFILE",
        SendConnectionRequest => "SEND_CONNECTION_REQUEST",
        LikePost => "LIKE_POST",
        CommentPost => "COMMENT_POST",
        SendMessage => "SEND_MESSAGE",
    }
}

define_wire_enum! {
    /// Job execution state. Transitions follow the dispatch DAG in
    /// `outpost_core::dispatch::state_machine`.
    JobState as "job_state" {
        Pending => "PENDING",
        Assigned => "ASSIGNED",
        Executing => "EXECUTING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Skipped => "SKIPPED",
    }
}

define_wire_enum! {
    /// Outcome reported by the executing agent.
    ResultStatus as "result_status" {
        Success => "SUCCESS",
        Failed => "FAILED",
        Skipped => "SKIPPED",
    }
}

define_wire_enum! {
    /// Connection state the agent observed on the target profile.
    ObservedState as "observed_connection_state" {
        Connected => "CONNECTED",
        Pending => "PENDING",
        None => "NONE",
    }
}

define_wire_enum! {
    /// Why an execution failed, as reported by the agent.
    FailureReason as "failure_reason" {
        UiChanged => "UI_CHANGED",
        Timeout => "TIMEOUT",
        SessionExpired => "SESSION_EXPIRED",
        Unknown => "UNKNOWN",
    }
}

define_wire_enum! {
    /// Severity of a recorded rate-limit violation.
    ViolationSeverity as "violation_severity" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

define_wire_enum! {
    /// Bucketed risk level derived from the numeric score.
    RiskLevel as "risk_level" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

define_wire_enum! {
    /// Who performed an audited action.
    ActorType as "actor_type" {
        User => "USER",
        Agent => "AGENT",
        System => "SYSTEM",
    }
}

/// Status the agent self-reports on heartbeat. Wire-only; the stored agent
/// state is derived from it (IDLE -> IDLE, EXECUTING -> ACTIVE, PAUSED -> IDLE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportedStatus {
    Idle,
    Executing,
    Paused,
}

/// Screenshot capture stage. Wire-only; persisted inside the audit payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenshotStage {
    Before,
    After,
    Failure,
}

/// Agent-side job event types. Wire-only; persisted as the audit event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEventType {
    ActionStarted,
    ActionCompleted,
    Warning,
    Info,
}

impl AgentEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActionStarted => "ACTION_STARTED",
            Self::ActionCompleted => "ACTION_COMPLETED",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl ScreenshotStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Failure => "FAILURE",
        }
    }
}
