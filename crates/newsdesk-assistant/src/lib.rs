//! Assistant vendor abstraction for newsdesk
//!
//! This crate provides the [`AssistantApi`] trait, the complete surface of
//! the hosted assistant service the rest of the workspace depends on:
//!
//! - thread creation
//! - appending user messages
//! - starting and retrieving runs
//! - submitting tool outputs
//! - listing a thread's messages
//!
//! plus a concrete OpenAI Assistants implementation behind the `openai`
//! feature.

pub mod error;
pub mod provider;

pub use error::{AssistantError, Result};
pub use provider::AssistantApi;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
