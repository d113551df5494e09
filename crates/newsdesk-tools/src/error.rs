//! Error types for tool execution

use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors a tool can report back to the run that called it
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl From<newsdesk_core::Error> for ToolError {
    fn from(err: newsdesk_core::Error) -> Self {
        match err {
            newsdesk_core::Error::InvalidArguments { reason, .. } => {
                ToolError::InvalidArguments(reason)
            }
        }
    }
}
