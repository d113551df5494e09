//! OpenAI Assistants provider implementation
//!
//! This module implements the [`AssistantApi`] trait against the OpenAI
//! Assistants (v2) REST surface.
//! See: https://platform.openai.com/docs/api-reference/assistants
//!
//! # Examples
//!
//! ## Basic usage with environment variables
//!
//! ```no_run
//! use newsdesk_assistant::AssistantApi;
//! use newsdesk_assistant::providers::OpenAIAssistantClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY and ASSISTANT_ID
//!     let client = OpenAIAssistantClient::from_env()?;
//!
//!     let thread = client.create_thread().await?;
//!     client.add_message(&thread.id, "What's new in Rust?").await?;
//!     let run = client.create_run(&thread.id).await?;
//!     println!("run {} is {}", run.id, run.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Custom configuration
//!
//! ```no_run
//! use newsdesk_assistant::providers::{OpenAIAssistantClient, OpenAIConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpenAIConfig::new("sk-...", "asst_...")
//!     .with_api_base("http://localhost:8000/v1")
//!     .with_timeout(30);
//!
//! let client = OpenAIAssistantClient::with_config(config)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use newsdesk_core::{Run, Thread, ThreadMessage, ToolOutput};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{AssistantApi, AssistantError, Result};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";
/// Largest page the messages endpoint returns
const MESSAGES_PAGE_LIMIT: u32 = 100;

/// Configuration for the OpenAI assistant client
#[derive(Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Assistant every run is started with
    pub assistant_id: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"<redacted>")
            .field("assistant_id", &self.assistant_id)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAIConfig {
    /// Create a new config with the given credentials and default settings
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `OPENAI_API_KEY` and `ASSISTANT_ID`, and `OPENAI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AssistantError::ConfigurationError(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;
        let assistant_id = std::env::var("ASSISTANT_ID").map_err(|_| {
            AssistantError::ConfigurationError(
                "ASSISTANT_ID environment variable not set".to_string(),
            )
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self::new(api_key, assistant_id).with_api_base(api_base))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Client for the OpenAI Assistants API
pub struct OpenAIAssistantClient {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIAssistantClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::ConfigurationError(
                "API key must not be empty".to_string(),
            ));
        }
        if config.assistant_id.trim().is_empty() {
            return Err(AssistantError::ConfigurationError(
                "assistant id must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new client with credentials and default settings
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key, assistant_id))
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// `{api_base}/{segments...}`, each segment percent-encoded on its own
    ///
    /// Thread and run ids arrive from callers, so a segment can never add
    /// path levels or climb out of the one it was placed in.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(AssistantError::InvalidRequest(format!(
                "invalid id '{bad}'"
            )));
        }

        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            AssistantError::ConfigurationError(format!(
                "invalid API base '{}': {e}",
                self.config.api_base
            ))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                AssistantError::ConfigurationError(format!(
                    "API base '{}' cannot carry a path",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.authorize(self.client.get(self.url(segments)?)))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.authorize(self.client.post(self.url(segments)?)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
    }

    /// Send a request and decode a successful JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = vendor_error_message(&error_text);

            return Err(match status.as_u16() {
                401 => AssistantError::AuthenticationFailed,
                429 => AssistantError::RateLimitExceeded(message),
                400 => AssistantError::InvalidRequest(message),
                404 => AssistantError::NotFound(format!("{what}: {message}")),
                _ => AssistantError::RequestFailed(format!("HTTP {status}: {message}")),
            });
        }

        response.json::<T>().await.map_err(|e| {
            AssistantError::UnexpectedResponse(format!("Failed to parse {what} response: {e}"))
        })
    }
}

#[async_trait]
impl AssistantApi for OpenAIAssistantClient {
    #[instrument(skip(self), fields(api_base = %self.config.api_base))]
    async fn create_thread(&self) -> Result<Thread> {
        let thread: Thread = self
            .send(self.post(&["threads"])?.json(&serde_json::json!({})), "thread")
            .await?;
        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    #[instrument(skip(self, content), fields(content_len = content.len()))]
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let request = CreateMessageRequest {
            role: "user",
            content,
        };
        let message: ThreadMessage = self
            .send(
                self.post(&["threads", thread_id, "messages"])?
                    .json(&request),
                "message",
            )
            .await?;
        debug!(message_id = %message.id, "Added message");
        Ok(message)
    }

    #[instrument(skip(self), fields(assistant_id = %self.config.assistant_id))]
    async fn create_run(&self, thread_id: &str) -> Result<Run> {
        let request = CreateRunRequest {
            assistant_id: &self.config.assistant_id,
        };
        let run: Run = self
            .send(
                self.post(&["threads", thread_id, "runs"])?
                    .json(&request),
                "run",
            )
            .await?;
        debug!(run_id = %run.id, status = %run.status, "Created run");
        Ok(run)
    }

    #[instrument(skip(self))]
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let run: Run = self
            .send(self.get(&["threads", thread_id, "runs", run_id])?, "run")
            .await?;
        debug!(status = %run.status, "Retrieved run");
        Ok(run)
    }

    #[instrument(skip(self, outputs), fields(output_count = outputs.len()))]
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run> {
        let request = SubmitToolOutputsRequest {
            tool_outputs: outputs,
        };
        let run: Run = self
            .send(
                self.post(&["threads", thread_id, "runs", run_id, "submit_tool_outputs"])?
                    .json(&request),
                "run",
            )
            .await?;
        debug!(status = %run.status, "Submitted tool outputs");
        Ok(run)
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let segments = ["threads", thread_id, "messages"];
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut request = self
                .get(&segments)?
                .query(&[("limit", MESSAGES_PAGE_LIMIT.to_string())]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor)]);
            }

            let page: MessageListResponse = self.send(request, "message list").await?;
            let page_len = page.data.len();
            messages.extend(page.data);

            match (page.has_more, page.last_id) {
                (true, Some(last_id)) if page_len > 0 => after = Some(last_id),
                _ => break,
            }
        }

        debug!(message_count = messages.len(), "Listed messages");
        Ok(messages)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Pull `error.message` out of a vendor error body, falling back to the raw text
fn vendor_error_message(body: &str) -> String {
    serde_json::from_str::<VendorErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// OpenAI-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitToolOutputsRequest {
    tool_outputs: Vec<ToolOutput>,
}

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct VendorErrorBody {
    error: VendorError,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_core::RunStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIAssistantClient {
        let config = OpenAIConfig::new("test-key", "asst_test").with_api_base(server.uri());
        OpenAIAssistantClient::with_config(config).unwrap()
    }

    fn run_json(status: &str) -> serde_json::Value {
        json!({
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "assistant_id": "asst_test",
            "status": status
        })
    }

    fn message_json(id: &str, role: &str, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "object": "thread.message",
            "thread_id": "thread_1",
            "role": role,
            "content": [{"type": "text", "text": {"value": text, "annotations": []}}]
        })
    }

    #[test]
    fn test_client_creation() {
        let client = OpenAIAssistantClient::new("test-key", "asst_1").unwrap();
        assert_eq!(client.name(), "openai");
        assert_eq!(client.config().api_base, "https://api.openai.com/v1");
        assert_eq!(client.config().assistant_id, "asst_1");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            OpenAIAssistantClient::new("", "asst_1"),
            Err(AssistantError::ConfigurationError(_))
        ));
        assert!(matches!(
            OpenAIAssistantClient::new("key", " "),
            Err(AssistantError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAIConfig::new("sk-secret", "asst_1");
        assert!(!format!("{config:?}").contains("sk-secret"));
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let config = OpenAIConfig::new("k", "a").with_api_base("http://localhost:8000/v1/");
        assert_eq!(config.api_base, "http://localhost:8000/v1");
    }

    #[test]
    fn test_vendor_error_message() {
        let body = r#"{"error": {"message": "No thread found with id 'x'.", "type": "invalid_request_error"}}"#;
        assert_eq!(vendor_error_message(body), "No thread found with id 'x'.");
        assert_eq!(vendor_error_message("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_create_thread() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("openai-beta", "assistants=v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "thread_1",
                "object": "thread",
                "created_at": 1_700_000_000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let thread = client_for(&server).create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_1");
    }

    #[tokio::test]
    async fn test_add_message_sends_user_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_json(json!({"role": "user", "content": "What's new?"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(message_json("msg_1", "user", "What's new?")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let message = client_for(&server)
            .add_message("thread_1", "What's new?")
            .await
            .unwrap();
        assert_eq!(message.id, "msg_1");
        assert_eq!(message.text(), "What's new?");
    }

    #[tokio::test]
    async fn test_add_message_unknown_thread() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/missing/messages"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No thread found with id 'missing'.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .add_message("missing", "hi")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("No thread found"));
    }

    #[tokio::test]
    async fn test_create_run_uses_assistant_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_json(json!({"assistant_id": "asst_test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued")))
            .expect(1)
            .mount(&server)
            .await;

        let run = client_for(&server).create_run("thread_1").await.unwrap();
        assert_eq!(run.id, "run_1");
        assert_eq!(run.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn test_submit_tool_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
            .and(body_json(json!({
                "tool_outputs": [{"tool_call_id": "call_1", "output": "[]"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued")))
            .expect(1)
            .mount(&server)
            .await;

        let run = client_for(&server)
            .submit_tool_outputs("thread_1", "run_1", vec![ToolOutput::new("call_1", "[]")])
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn test_status_code_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/t/runs/unauthorized"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t/runs/limited"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t/runs/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t/runs/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.retrieve_run("t", "unauthorized").await,
            Err(AssistantError::AuthenticationFailed)
        ));
        assert!(matches!(
            client.retrieve_run("t", "limited").await,
            Err(AssistantError::RateLimitExceeded(msg)) if msg == "slow down"
        ));
        assert!(matches!(
            client.retrieve_run("t", "broken").await,
            Err(AssistantError::RequestFailed(_))
        ));
        assert!(matches!(
            client.retrieve_run("t", "garbled").await,
            Err(AssistantError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_messages_follows_pagination_in_vendor_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("after", "msg_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [message_json("msg_1", "user", "first")],
                "first_id": "msg_1",
                "last_id": "msg_1",
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    message_json("msg_3", "assistant", "third"),
                    message_json("msg_2", "user", "second")
                ],
                "first_id": "msg_3",
                "last_id": "msg_2",
                "has_more": true
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let messages = client_for(&server).list_messages("thread_1").await.unwrap();
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["msg_3", "msg_2", "msg_1"]);
    }

    #[tokio::test]
    async fn test_ids_stay_inside_their_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.add_message("../assistants", "hi").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(
            client
                .submit_tool_outputs("thread_1", "run_1/../x?y#z", Vec::new())
                .await
                .is_err()
        );

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], "/threads/..%2Fassistants/messages");
        assert!(paths[1].starts_with("/threads/thread_1/runs/run_1%2F..%2Fx"));
        assert!(paths[1].ends_with("/submit_tool_outputs"));
    }

    #[tokio::test]
    async fn test_dot_ids_rejected_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.add_message(id, "hi").await,
                Err(AssistantError::InvalidRequest(_))
            ));
        }
        assert!(matches!(
            client.retrieve_run("thread_1", "..").await,
            Err(AssistantError::InvalidRequest(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_api_base_without_path_support_rejected() {
        let config = OpenAIConfig::new("k", "a").with_api_base("mailto:ops@example.com");
        let client = OpenAIAssistantClient::with_config(config).unwrap();
        assert!(matches!(
            client.url(&["threads"]),
            Err(AssistantError::ConfigurationError(_))
        ));
    }
}
