//! Job dispatch constants and state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the API/repository layer and any future worker or CLI tooling.

// ---------------------------------------------------------------------------
// Dispatch policy constants
// ---------------------------------------------------------------------------

/// Recommended agent poll interval returned on registration, in seconds.
pub const POLL_INTERVAL_SECS: i32 = 15;

/// Default and maximum number of jobs handed out per pull.
pub const MAX_PULL_BATCH: i64 = 5;

/// Grace added on top of a job's own timeout before the reaper may fail it,
/// in seconds.
pub const REAPER_GRACE_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Job state names matching the `job_state` database enum.
///
/// The state machine is intentionally duplicated from the `db` crate's
/// `JobState` enum because `core` must have zero internal deps.
pub mod state_machine {
    /// Returns the set of valid target states reachable from `from`.
    ///
    /// Terminal states (COMPLETED, FAILED, SKIPPED) return an empty slice
    /// because no further transitions are allowed.
    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            "PENDING" => &["ASSIGNED"],
            "ASSIGNED" => &["EXECUTING", "COMPLETED", "FAILED", "SKIPPED"],
            "EXECUTING" => &["COMPLETED", "FAILED", "SKIPPED"],
            // Terminal states are absorbing.
            "COMPLETED" | "FAILED" | "SKIPPED" => &[],
            // Unknown state: no transitions allowed.
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {from} -> {to}"))
        }
    }

    /// Whether a state is terminal (absorbing).
    pub fn is_terminal(state: &str) -> bool {
        valid_transitions(state).is_empty() && matches!(state, "COMPLETED" | "FAILED" | "SKIPPED")
    }
}
