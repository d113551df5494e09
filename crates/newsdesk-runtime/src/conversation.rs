//! Conversation sessions and the send-and-wait flow

use std::sync::Arc;

use newsdesk_assistant::AssistantApi;
use newsdesk_core::ThreadMessage;
use newsdesk_tools::ToolRegistry;
use tracing::{info, instrument};

use crate::executor::ToolExecutor;
use crate::poller::{PollerConfig, RunPoller};
use crate::{Result, RuntimeError};

/// Creates sessions and appends user messages to them
pub struct ConversationManager {
    api: Arc<dyn AssistantApi>,
}

impl ConversationManager {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self { api }
    }

    /// Allocate a new session, returning its id
    #[instrument(skip(self), fields(vendor = %self.api.name()))]
    pub async fn create_session(&self) -> Result<String> {
        let thread = self.api.create_thread().await?;
        info!(thread_id = %thread.id, "Session created");
        Ok(thread.id)
    }

    /// Append a user message to an existing session
    ///
    /// An unknown session id surfaces as the vendor's not-found error.
    #[instrument(skip(self, text), fields(text_length = text.len()))]
    pub async fn add_message(&self, thread_id: &str, text: &str) -> Result<ThreadMessage> {
        let message = self.api.add_message(thread_id, text).await?;
        info!(message_id = %message.id, "Message added");
        Ok(message)
    }
}

/// Session management plus run polling behind one handle
pub struct ConversationService {
    sessions: ConversationManager,
    poller: RunPoller,
}

impl ConversationService {
    pub fn new(
        api: Arc<dyn AssistantApi>,
        registry: Arc<ToolRegistry>,
        config: PollerConfig,
    ) -> Self {
        Self {
            sessions: ConversationManager::new(api.clone()),
            poller: RunPoller::new(api, ToolExecutor::new(registry), config),
        }
    }

    pub async fn create_session(&self) -> Result<String> {
        self.sessions.create_session().await
    }

    /// Send a user message and wait for the run it triggers to complete
    ///
    /// Returns every message of the thread in vendor order.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, thread_id: &str, text: &str) -> Result<Vec<ThreadMessage>> {
        if thread_id.trim().is_empty() {
            return Err(RuntimeError::InvalidInput(
                "threadId must not be empty".to_string(),
            ));
        }
        if !is_session_id(thread_id) {
            return Err(RuntimeError::InvalidInput(format!(
                "threadId '{thread_id}' is not a valid session id"
            )));
        }
        if text.trim().is_empty() {
            return Err(RuntimeError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        self.sessions.add_message(thread_id, text).await?;
        let run = self.poller.start_run(thread_id).await?;
        self.poller.await_completion(thread_id, &run.id).await
    }
}

/// Vendor thread ids are ASCII word characters, e.g. `thread_abc123`
fn is_session_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
