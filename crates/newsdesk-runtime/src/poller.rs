//! Run polling
//!
//! The vendor never pushes run updates, so a run is driven by fetching its
//! status on a fixed period. Each status is handled as follows:
//!
//! - `completed`: the thread's messages are fetched and returned
//! - `requires_action`: every pending tool call is executed and the outputs
//!   submitted in one batch
//! - `failed`, `cancelled`, `expired`, `incomplete`: polling stops with
//!   [`RuntimeError::RunTerminated`]
//! - anything else: nothing to do, poll again on the next tick
//!
//! Polling gives up with [`RuntimeError::PollTimeout`] after
//! [`PollerConfig::max_attempts`] polls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use newsdesk_assistant::AssistantApi;
use newsdesk_core::{Run, RunStatus, ThreadMessage, ToolCall};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, instrument, warn};

use crate::executor::ToolExecutor;
use crate::{Result, RuntimeError};

/// Poll periods are clamped to this so the first deadline stays representable
const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between two status fetches
    pub interval: Duration,

    /// Polls before giving up
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

impl PollerConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// State of one in-flight run, owned by the loop polling it
#[derive(Debug, Clone)]
pub struct RunTracker {
    pub thread_id: String,
    pub run_id: String,
    submitted: HashSet<String>,
    attempts: u32,
}

impl RunTracker {
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            submitted: HashSet::new(),
            attempts: 0,
        }
    }

    /// Number of status fetches made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether an output was already submitted for this tool call
    pub fn was_submitted(&self, tool_call_id: &str) -> bool {
        self.submitted.contains(tool_call_id)
    }
}

/// What a single poll observed
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The run completed; the thread's messages in vendor order
    Completed(Vec<ThreadMessage>),
    /// Tool outputs were submitted for this many calls
    ToolOutputsSubmitted(usize),
    /// Nothing to do yet
    Pending(RunStatus),
}

pub struct RunPoller {
    api: Arc<dyn AssistantApi>,
    executor: ToolExecutor,
    config: PollerConfig,
}

impl RunPoller {
    pub fn new(api: Arc<dyn AssistantApi>, executor: ToolExecutor, config: PollerConfig) -> Self {
        Self {
            api,
            executor,
            config,
        }
    }

    /// Ask the vendor to process the thread's accumulated messages
    #[instrument(skip(self), fields(vendor = %self.api.name()))]
    pub async fn start_run(&self, thread_id: &str) -> Result<Run> {
        let run = self.api.create_run(thread_id).await?;
        info!(run_id = %run.id, status = %run.status, "Run started");
        Ok(run)
    }

    /// Fetch the run's status once and act on it
    pub async fn poll_once(&self, tracker: &mut RunTracker) -> Result<PollOutcome> {
        tracker.attempts += 1;

        let run = self
            .api
            .retrieve_run(&tracker.thread_id, &tracker.run_id)
            .await?;
        debug!(
            run_id = %run.id,
            status = %run.status,
            attempt = tracker.attempts,
            "Polled run"
        );

        match &run.status {
            RunStatus::Completed => {
                let messages = self.api.list_messages(&tracker.thread_id).await?;
                info!(
                    run_id = %run.id,
                    attempts = tracker.attempts,
                    message_count = messages.len(),
                    "Run completed"
                );
                Ok(PollOutcome::Completed(messages))
            }
            RunStatus::RequiresAction => self.submit_pending(tracker, &run).await,
            status if status.is_failure() => {
                let reason = run.failure_reason();
                error!(run_id = %run.id, status = %status, reason = %reason, "Run terminated");
                Err(RuntimeError::RunTerminated {
                    status: status.clone(),
                    reason,
                })
            }
            RunStatus::Unknown(raw) => {
                warn!(run_id = %run.id, status = %raw, "Unrecognized run status, still polling");
                Ok(PollOutcome::Pending(run.status.clone()))
            }
            status => Ok(PollOutcome::Pending(status.clone())),
        }
    }

    /// Execute the tool calls not yet answered and submit their outputs
    async fn submit_pending(&self, tracker: &mut RunTracker, run: &Run) -> Result<PollOutcome> {
        let calls: Vec<&ToolCall> = run
            .pending_tool_calls()
            .iter()
            .filter(|call| !tracker.was_submitted(&call.id))
            .collect();

        if calls.is_empty() {
            debug!(run_id = %run.id, "No unanswered tool calls");
            return Ok(PollOutcome::Pending(run.status.clone()));
        }

        let outputs = self.executor.execute_calls(&calls).await;
        let count = outputs.len();
        let ids: Vec<String> = outputs.iter().map(|o| o.tool_call_id.clone()).collect();

        self.api
            .submit_tool_outputs(&tracker.thread_id, &tracker.run_id, outputs)
            .await?;
        tracker.submitted.extend(ids);

        info!(run_id = %run.id, output_count = count, "Tool outputs submitted");
        Ok(PollOutcome::ToolOutputsSubmitted(count))
    }

    /// Poll until the run completes, fails, or the attempt budget runs out
    ///
    /// The first poll happens one interval after the call. A tick is never
    /// started while the previous poll is still in flight.
    #[instrument(skip(self), fields(vendor = %self.api.name()))]
    pub async fn await_completion(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<ThreadMessage>> {
        let mut tracker = RunTracker::new(thread_id, run_id);
        let period = self
            .config
            .interval
            .clamp(Duration::from_millis(1), MAX_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while tracker.attempts < self.config.max_attempts {
            ticker.tick().await;
            match self.poll_once(&mut tracker).await? {
                PollOutcome::Completed(messages) => return Ok(messages),
                PollOutcome::ToolOutputsSubmitted(_) | PollOutcome::Pending(_) => {}
            }
        }

        warn!(
            attempts = tracker.attempts,
            interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Run did not complete in time"
        );
        Err(RuntimeError::PollTimeout {
            attempts: tracker.attempts,
        })
    }
}
