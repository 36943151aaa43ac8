// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Completion polling shared by every print task.
//
// Printers report job progress only when asked. The poller asks at a fixed
// cadence until the printer reports a terminal status or the overall deadline
// would be exceeded by waiting another interval.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::DeviceStatus;

/// Operation name used in completion timeout errors.
pub const WAIT_FOR_FINISHED: &str = "wait for finished";

/// How a successful completion wait went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Number of status queries issued, including the terminal one.
    pub polls: u32,
    /// Time from entering the wait to observing the terminal status.
    pub elapsed: Duration,
}

/// Poll `check` every `interval` until it reports a terminal status.
///
/// - `DeviceStatus::Finished` resolves to `Ok(PollReport)`.
/// - `DeviceStatus::Error` resolves to `LabelwerkError::Device`.
/// - An error from `check` itself is returned unchanged.
/// - If sleeping another `interval` would pass the deadline, or a single
///   status query outlives it, the wait fails with `LabelwerkError::Timeout`.
///   Its `after_ms` is the time actually spent waiting, which is below
///   `timeout` when the next poll would have landed past the deadline.
pub async fn poll_until_finished<F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<DeviceStatus>>,
{
    let started = Instant::now();
    let deadline = started + timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let status = tokio::time::timeout(remaining, check())
            .await
            .map_err(|_| {
                warn!(polls, "status query outlived the completion deadline");
                timeout_error(started.elapsed())
            })??;

        match status {
            DeviceStatus::Finished => {
                let elapsed = started.elapsed();
                debug!(polls, elapsed_ms = elapsed.as_millis() as u64, "printer reported finished");
                return Ok(PollReport { polls, elapsed });
            }
            DeviceStatus::Error(detail) => {
                warn!(polls, error = %detail, "printer reported an error");
                return Err(LabelwerkError::Device(detail));
            }
            DeviceStatus::Printing { page, progress } => {
                trace!(polls, page, progress, "printer still busy");
            }
        }

        let now = Instant::now();
        if now >= deadline || now + interval > deadline {
            let waited = now.duration_since(started);
            warn!(
                polls,
                waited_ms = waited.as_millis() as u64,
                timeout_ms = timeout.as_millis() as u64,
                "no terminal status before deadline"
            );
            return Err(timeout_error(waited));
        }
        tokio::time::sleep(interval).await;
    }
}

fn timeout_error(waited: Duration) -> LabelwerkError {
    LabelwerkError::Timeout {
        operation: WAIT_FOR_FINISHED,
        after_ms: waited.as_millis() as u64,
    }
}
