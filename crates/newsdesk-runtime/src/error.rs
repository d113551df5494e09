//! Error types for run orchestration

use newsdesk_assistant::AssistantError;
use newsdesk_core::RunStatus;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A vendor call failed
    #[error(transparent)]
    Assistant(#[from] AssistantError),

    /// The run stopped without completing
    #[error("Run ended with status {status}: {reason}")]
    RunTerminated { status: RunStatus, reason: String },

    /// The run did not complete within the poll budget
    #[error("Run did not complete after {attempts} polls")]
    PollTimeout { attempts: u32 },

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RuntimeError {
    /// Whether the vendor reported a missing thread or run
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Assistant(e) if e.is_not_found())
    }
}
