//! Concrete assistant vendor implementations

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIAssistantClient, OpenAIConfig};
