//! Error types for newsdesk-core

use thiserror::Error;

/// Result type alias for newsdesk-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for domain operations
#[derive(Error, Debug)]
pub enum Error {
    /// Tool call arguments were not the JSON the tool expects
    #[error("Invalid arguments for tool call {call_id}: {reason}")]
    InvalidArguments { call_id: String, reason: String },
}
