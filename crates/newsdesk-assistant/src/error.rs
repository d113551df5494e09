//! Error types for assistant vendor operations

use thiserror::Error;

/// Result type for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors that can occur while talking to the assistant vendor
#[derive(Error, Debug)]
pub enum AssistantError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Thread, run or assistant does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP error
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AssistantError {
    /// Whether the vendor reported that the referenced object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
