//! Background tasks.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown. Neither task is required for correctness: the
//! reaper is a backstop for agents that never report, the sweeper is
//! retention cleanup.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod job_reaper;
pub mod token_sweeper;
