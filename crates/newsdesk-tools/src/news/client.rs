//! NewsAPI client for article search

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_NEWS_API_BASE: &str = "https://newsapi.org/v2";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_RATE_LIMIT: u32 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from the news search vendor
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response without a structured error body
    #[error("NewsAPI returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The vendor answered with `status: "error"`
    #[error("NewsAPI error {code}: {message}")]
    Vendor { code: String, message: String },

    /// Response body did not have the expected shape
    #[error("Failed to parse NewsAPI response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reduced article summary handed back to the assistant
///
/// Fields are copied verbatim; the vendor sends `null` for missing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

/// Search for news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Articles matching `query`, at most one page
    async fn search(&self, query: &str) -> Result<Vec<Article>, NewsError>;
}

/// Configuration for the NewsAPI client
#[derive(Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    /// Base URL (default: "https://newsapi.org/v2")
    pub api_base: String,
    /// Articles requested per search (default: 10)
    pub page_size: u32,
    /// Requests per minute allowed by the local rate limiter
    pub rate_limit: u32,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("page_size", &self.page_size)
            .field("rate_limit", &self.rate_limit)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_NEWS_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = per_minute;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// NewsAPI `/everything` client with rate limiting
pub struct NewsApiClient {
    client: Client,
    config: NewsApiConfig,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    pub fn new(config: NewsApiConfig) -> Result<Self, NewsError> {
        if config.api_key.trim().is_empty() {
            return Err(NewsError::Config("API key must not be empty".to_string()));
        }
        if config.page_size == 0 {
            return Err(NewsError::Config("page size must be greater than 0".to_string()));
        }
        let rate_limit = NonZeroU32::new(config.rate_limit)
            .ok_or_else(|| NewsError::Config("rate limit must be greater than 0".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rate_limit))),
        })
    }

    pub fn config(&self) -> &NewsApiConfig {
        &self.config
    }
}

#[async_trait]
impl NewsSearch for NewsApiClient {
    #[instrument(skip(self), fields(page_size = self.config.page_size))]
    async fn search(&self, query: &str) -> Result<Vec<Article>, NewsError> {
        self.rate_limiter.until_ready().await;

        let page_size = self.config.page_size.to_string();
        let response = self
            .client
            .get(format!("{}/everything", self.config.api_base))
            .query(&[
                ("q", query),
                ("apiKey", self.config.api_key.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: EverythingResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(NewsError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(NewsError::Parse(e.to_string())),
        };

        if parsed.status == "error" || !status.is_success() {
            return Err(NewsError::Vendor {
                code: parsed.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: parsed.message.unwrap_or_default(),
            });
        }

        let articles: Vec<Article> = parsed
            .articles
            .into_iter()
            .take(self.config.page_size as usize)
            .map(Article::from)
            .collect();

        debug!(
            article_count = articles.len(),
            total_results = parsed.total_results,
            "NewsAPI search finished"
        );
        Ok(articles)
    }
}

// ============================================================================
// NewsAPI response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            url: raw.url,
            title: raw.title,
            description: raw.description,
            content: raw.content,
        }
    }
}
