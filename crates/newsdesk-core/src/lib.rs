//! Core domain types for newsdesk
//!
//! These mirror the assistant vendor's objects closely enough to be
//! deserialized straight off the wire:
//!
//! - [`Thread`]: a conversation session owned by the vendor
//! - [`ThreadMessage`]: one user or assistant message in a thread
//! - [`Run`]: one processing pass of the assistant over a thread
//! - [`ToolCall`] / [`ToolOutput`]: a function the run wants executed locally,
//!   and the result sent back for it

pub mod error;
pub mod run;
pub mod thread;

pub use error::{Error, Result};
pub use run::{
    FunctionCall, RequiredAction, Run, RunError, RunStatus, SubmitToolOutputs, ToolCall,
    ToolOutput,
};
pub use thread::{MessageContent, Role, TextContent, Thread, ThreadMessage};
