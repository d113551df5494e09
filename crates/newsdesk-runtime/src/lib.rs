//! Run orchestration for newsdesk
//!
//! This crate turns the single-call operations of an
//! [`AssistantApi`](newsdesk_assistant::AssistantApi) into the
//! "send a message and wait for the reply" flow:
//!
//! 1. Append the user message to the thread
//! 2. Start a run
//! 3. Poll the run on a fixed period, answering any tool calls it requests
//! 4. Once completed, return the thread's messages
//!
//! Every poll loop is owned by the future that awaits it. Dropping that
//! future stops polling.

pub mod conversation;
pub mod error;
pub mod executor;
pub mod poller;

#[cfg(test)]
mod test_support;

pub use conversation::{ConversationManager, ConversationService};
pub use error::{Result, RuntimeError};
pub use executor::ToolExecutor;
pub use poller::{PollOutcome, PollerConfig, RunPoller, RunTracker};
