//! News search: the NewsAPI client and the tool that exposes it to runs

pub mod client;
pub mod tool;

pub use client::{Article, NewsApiClient, NewsApiConfig, NewsError, NewsSearch};
pub use tool::{NEWS_UNAVAILABLE, NewsLookup, NewsSearchTool};
