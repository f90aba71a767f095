//! Bounded polling of run status

use crate::api::AssistantApi;
use crate::error::{AssistantError, Result};
use crate::types::{Run, RunStatus};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Default delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default upper bound on how long a run may take
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

const FAILED_FALLBACK: &str = "Assistant failed to respond.";

/// Polls a run at a fixed interval until it is terminal or `max_wait` elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPoller {
    interval: Duration,
    max_wait: Duration,
}

impl Default for RunPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

impl RunPoller {
    /// Create a poller
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Delay between status checks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Upper bound on the total wait
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Wait until the run completes
    ///
    /// The status is checked immediately and then once per interval. A run
    /// that ends in any state other than `completed` is reported as
    /// [`AssistantError::RunFailed`]; `requires_action` counts as a failure
    /// since tool outputs are never submitted. If the run is still active once
    /// `max_wait` has elapsed, [`AssistantError::Timeout`] is returned.
    pub async fn wait_for_completion(
        &self,
        api: &dyn AssistantApi,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Run> {
        let started = Instant::now();
        let deadline = started + self.max_wait;
        let mut attempts: u32 = 0;

        loop {
            let run = api.retrieve_run(thread_id, run_id).await?;
            attempts += 1;
            debug!(thread_id, run_id, status = %run.status, attempts, "Polled run");

            match run.status {
                RunStatus::Completed => return Ok(run),
                RunStatus::Failed => {
                    let message = run
                        .last_error
                        .as_ref()
                        .map(|e| e.message.clone())
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| FAILED_FALLBACK.to_string());
                    warn!(thread_id, run_id, %message, "Run failed");
                    return Err(AssistantError::RunFailed {
                        status: run.status,
                        message,
                    });
                }
                status if status.is_terminal() || status == RunStatus::RequiresAction => {
                    warn!(thread_id, run_id, %status, "Run ended without a reply");
                    return Err(AssistantError::RunFailed {
                        status,
                        message: format!("run ended with status `{status}`"),
                    });
                }
                _ => {}
            }

            let now = Instant::now();
            if now >= deadline {
                let waited = now - started;
                warn!(thread_id, run_id, waited_secs = waited.as_secs(), "Gave up waiting for run");
                return Err(AssistantError::Timeout { waited });
            }
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
