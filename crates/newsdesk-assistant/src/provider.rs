//! Assistant vendor trait definition

use async_trait::async_trait;
use newsdesk_core::{Run, Thread, ThreadMessage, ToolOutput};

use crate::Result;

/// Trait for assistant vendors
///
/// Every operation is a single outbound call. Implementations do not retry
/// and do not poll; the runtime crate owns that.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Allocate a new conversation thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a user message to a thread
    ///
    /// Fails with [`AssistantError::NotFound`](crate::AssistantError::NotFound)
    /// if the thread does not exist.
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage>;

    /// Start processing the thread's accumulated messages
    async fn create_run(&self, thread_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Answer the tool calls of a run waiting in `requires_action`
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run>;

    /// All messages of a thread, in the order the vendor lists them
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;

    /// Get the vendor name (e.g., "openai")
    fn name(&self) -> &str;
}
