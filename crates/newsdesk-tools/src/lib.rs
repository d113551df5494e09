//! Tool management and execution framework for newsdesk
//!
//! Tools are the functions a run may ask this process to execute. The only
//! one shipped is the news search tool in [`news`], backed by NewsAPI.

pub mod error;
pub mod news;
pub mod registry;
pub mod tool;

pub use error::{Result, ToolError};
pub use news::{
    Article, NEWS_UNAVAILABLE, NewsApiClient, NewsApiConfig, NewsError, NewsLookup, NewsSearch,
    NewsSearchTool,
};
pub use registry::ToolRegistry;
pub use tool::Tool;
