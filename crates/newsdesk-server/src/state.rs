//! Shared application state and its construction from settings

use std::sync::Arc;

use anyhow::Context;
use newsdesk_assistant::AssistantApi;
use newsdesk_assistant::providers::{OpenAIAssistantClient, OpenAIConfig};
use newsdesk_runtime::{ConversationService, PollerConfig};
use newsdesk_tools::{NewsApiClient, NewsApiConfig, NewsSearch, NewsSearchTool, ToolRegistry};
use newsdesk_utils::Settings;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationService>,
}

impl AppState {
    pub fn new(conversations: Arc<ConversationService>) -> Self {
        Self { conversations }
    }

    /// Wire the vendor clients, tool registry and poller from settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let assistant_config =
            OpenAIConfig::new(&settings.openai_api_key, &settings.assistant_id)
                .with_api_base(&settings.openai_api_base)
                .with_timeout(settings.request_timeout.as_secs());
        let assistant: Arc<dyn AssistantApi> = Arc::new(
            OpenAIAssistantClient::with_config(assistant_config)
                .context("Failed to create assistant client")?,
        );

        let news_config = NewsApiConfig::new(&settings.news_api_key)
            .with_api_base(&settings.news_api_base)
            .with_page_size(settings.news_page_size)
            .with_rate_limit(settings.news_rate_limit)
            .with_timeout(settings.request_timeout.as_secs());
        let news: Arc<dyn NewsSearch> =
            Arc::new(NewsApiClient::new(news_config).context("Failed to create news client")?);

        let registry = ToolRegistry::new();
        registry.register(Arc::new(NewsSearchTool::new(
            news,
            settings.news_tool_name.clone(),
        )));
        info!(
            vendor = %assistant.name(),
            tools = ?registry.names(),
            poll_interval_secs = settings.poll_interval.as_secs(),
            poll_max_attempts = settings.poll_max_attempts,
            "Conversation service ready"
        );

        let poller = PollerConfig::new(settings.poll_interval, settings.poll_max_attempts);
        Ok(Self::new(Arc::new(ConversationService::new(
            assistant,
            Arc::new(registry),
            poller,
        ))))
    }
}
