//! Tool for answering a run's news search requests

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::client::{Article, NewsSearch};
use crate::{Result, Tool, ToolError};

/// Output submitted in place of articles when the search fails
pub const NEWS_UNAVAILABLE: &str =
    "Sorry, I could not retrieve the news information at this moment.";

/// Outcome of a news lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsLookup {
    Articles(Vec<Article>),
    /// The vendor could not be reached or rejected the request
    Unavailable { reason: String },
}

impl NewsLookup {
    /// Run a search, converting failure into [`NewsLookup::Unavailable`]
    pub async fn fetch(search: &dyn NewsSearch, query: &str) -> Self {
        match search.search(query).await {
            Ok(articles) => Self::Articles(articles),
            Err(e) => {
                warn!(query = %query, error = %e, "News lookup failed");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// What the assistant sees: the article list, or the apology sentence
    pub fn to_tool_output(&self) -> Value {
        match self {
            Self::Articles(articles) => json!(articles),
            Self::Unavailable { .. } => Value::String(NEWS_UNAVAILABLE.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Articles(_))
    }
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    query: String,
}

/// Tool exposing news search to the assistant
pub struct NewsSearchTool {
    search: Arc<dyn NewsSearch>,
    name: String,
}

impl NewsSearchTool {
    /// Create a new news tool registered under `name`
    pub fn new(search: Arc<dyn NewsSearch>, name: impl Into<String>) -> Self {
        Self {
            search,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Tool for NewsSearchTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: NewsParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let query = params.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }

        info!(query = %query, "Searching news");
        let lookup = NewsLookup::fetch(self.search.as_ref(), query).await;
        if let NewsLookup::Articles(articles) = &lookup {
            info!(article_count = articles.len(), "News search returned articles");
        }

        Ok(lookup.to_tool_output())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
