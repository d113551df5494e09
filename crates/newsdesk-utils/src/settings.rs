//! Environment-backed settings for the newsdesk server
//!
//! Three values are required: the assistant vendor credential
//! (`OPENAI_API_KEY`), the pre-provisioned assistant id (`ASSISTANT_ID`) and
//! the news vendor credential (`NEWS_API_KEY`). Everything else has a default.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ASSISTANT_ID: &str = "ASSISTANT_ID";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_OPENAI_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_NEWS_API_BASE: &str = "NEWS_API_BASE";
pub const ENV_POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
pub const ENV_POLL_MAX_ATTEMPTS: &str = "POLL_MAX_ATTEMPTS";
pub const ENV_NEWS_PAGE_SIZE: &str = "NEWS_PAGE_SIZE";
pub const ENV_NEWS_RATE_LIMIT: &str = "NEWS_RATE_LIMIT";
pub const ENV_NEWS_TOOL_NAME: &str = "NEWS_TOOL_NAME";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_NEWS_API_BASE: &str = "https://newsapi.org/v2";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_NEWS_PAGE_SIZE: u32 = 10;
pub const DEFAULT_NEWS_RATE_LIMIT: u32 = 60;
pub const DEFAULT_NEWS_TOOL_NAME: &str = "getNewsInformation";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// NewsAPI rejects page sizes above this
pub const MAX_NEWS_PAGE_SIZE: u32 = 100;

/// Longest accepted period between run status checks
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Errors raised while loading settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required variable is not set or is blank
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: '{value}' ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A value parsed but violates a constraint
    #[error("{0}")]
    Constraint(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Runtime settings for the server and its vendor clients
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Bearer credential for the assistant vendor
    pub openai_api_key: String,
    /// Assistant configuration every run is started with
    pub assistant_id: String,
    /// Credential for the news search vendor
    pub news_api_key: String,
    pub host: String,
    pub port: u16,
    pub openai_api_base: String,
    pub news_api_base: String,
    /// Period between run status checks
    pub poll_interval: Duration,
    /// Checks before a run is given up on
    pub poll_max_attempts: u32,
    pub news_page_size: u32,
    /// News requests allowed per minute
    pub news_rate_limit: u32,
    /// Function name the assistant uses to ask for news
    pub news_tool_name: String,
    /// Timeout applied to each outbound HTTP call
    pub request_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &"<redacted>")
            .field("assistant_id", &self.assistant_id)
            .field("news_api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("openai_api_base", &self.openai_api_base)
            .field("news_api_base", &self.news_api_base)
            .field("poll_interval", &self.poll_interval)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("news_page_size", &self.news_page_size)
            .field("news_rate_limit", &self.news_rate_limit)
            .field("news_tool_name", &self.news_tool_name)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Settings {
    /// Create a new settings builder
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Settings::builder()
            .openai_api_key(get(ENV_OPENAI_API_KEY).ok_or(SettingsError::Missing(ENV_OPENAI_API_KEY))?)
            .assistant_id(get(ENV_ASSISTANT_ID).ok_or(SettingsError::Missing(ENV_ASSISTANT_ID))?)
            .news_api_key(get(ENV_NEWS_API_KEY).ok_or(SettingsError::Missing(ENV_NEWS_API_KEY))?);

        if let Some(host) = get(ENV_HOST) {
            builder = builder.host(host);
        }
        if let Some(port) = parse_var::<u16>(ENV_PORT, get(ENV_PORT))? {
            builder = builder.port(port);
        }
        if let Some(base) = get(ENV_OPENAI_API_BASE) {
            builder = builder.openai_api_base(base);
        }
        if let Some(base) = get(ENV_NEWS_API_BASE) {
            builder = builder.news_api_base(base);
        }
        if let Some(secs) = parse_var::<u64>(ENV_POLL_INTERVAL_SECS, get(ENV_POLL_INTERVAL_SECS))? {
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        if let Some(attempts) =
            parse_var::<u32>(ENV_POLL_MAX_ATTEMPTS, get(ENV_POLL_MAX_ATTEMPTS))?
        {
            builder = builder.poll_max_attempts(attempts);
        }
        if let Some(size) = parse_var::<u32>(ENV_NEWS_PAGE_SIZE, get(ENV_NEWS_PAGE_SIZE))? {
            builder = builder.news_page_size(size);
        }
        if let Some(limit) = parse_var::<u32>(ENV_NEWS_RATE_LIMIT, get(ENV_NEWS_RATE_LIMIT))? {
            builder = builder.news_rate_limit(limit);
        }
        if let Some(name) = get(ENV_NEWS_TOOL_NAME) {
            builder = builder.news_tool_name(name);
        }
        if let Some(secs) =
            parse_var::<u64>(ENV_REQUEST_TIMEOUT_SECS, get(ENV_REQUEST_TIMEOUT_SECS))?
        {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(SettingsError::Missing(ENV_OPENAI_API_KEY));
        }
        if self.assistant_id.trim().is_empty() {
            return Err(SettingsError::Missing(ENV_ASSISTANT_ID));
        }
        if self.news_api_key.trim().is_empty() {
            return Err(SettingsError::Missing(ENV_NEWS_API_KEY));
        }
        if self.poll_interval.is_zero() || self.poll_interval > MAX_POLL_INTERVAL {
            return Err(SettingsError::Constraint(format!(
                "poll interval must be between 1s and {}s",
                MAX_POLL_INTERVAL.as_secs()
            )));
        }
        if self.poll_max_attempts == 0 {
            return Err(SettingsError::Constraint(
                "poll max attempts must be greater than 0".to_string(),
            ));
        }
        if self.news_page_size == 0 || self.news_page_size > MAX_NEWS_PAGE_SIZE {
            return Err(SettingsError::Constraint(format!(
                "news page size must be between 1 and {MAX_NEWS_PAGE_SIZE}"
            )));
        }
        if self.news_rate_limit == 0 {
            return Err(SettingsError::Constraint(
                "news rate limit must be greater than 0".to_string(),
            ));
        }
        if self.news_tool_name.trim().is_empty() {
            return Err(SettingsError::Constraint(
                "news tool name must not be empty".to_string(),
            ));
        }
        // Vendor clients take whole seconds
        if self.request_timeout < Duration::from_secs(1) {
            return Err(SettingsError::Constraint(
                "request timeout must be at least 1s".to_string(),
            ));
        }

        Ok(())
    }

    /// Upper bound on how long one message can wait for its run
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.poll_max_attempts)
    }

    /// Address the HTTP facade binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &'static str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| SettingsError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Builder for Settings
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    openai_api_key: Option<String>,
    assistant_id: Option<String>,
    news_api_key: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    openai_api_base: Option<String>,
    news_api_base: Option<String>,
    poll_interval: Option<Duration>,
    poll_max_attempts: Option<u32>,
    news_page_size: Option<u32>,
    news_rate_limit: Option<u32>,
    news_tool_name: Option<String>,
    request_timeout: Option<Duration>,
}

impl SettingsBuilder {
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = Some(id.into());
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    pub fn news_api_base(mut self, base: impl Into<String>) -> Self {
        self.news_api_base = Some(base.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn poll_max_attempts(mut self, attempts: u32) -> Self {
        self.poll_max_attempts = Some(attempts);
        self
    }

    pub fn news_page_size(mut self, size: u32) -> Self {
        self.news_page_size = Some(size);
        self
    }

    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    pub fn news_tool_name(mut self, name: impl Into<String>) -> Self {
        self.news_tool_name = Some(name.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the settings
    pub fn build(self) -> Result<Settings> {
        let settings = Settings {
            openai_api_key: self.openai_api_key.unwrap_or_default(),
            assistant_id: self.assistant_id.unwrap_or_default(),
            news_api_key: self.news_api_key.unwrap_or_default(),
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            openai_api_base: trim_base(
                self.openai_api_base
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            ),
            news_api_base: trim_base(
                self.news_api_base
                    .unwrap_or_else(|| DEFAULT_NEWS_API_BASE.to_string()),
            ),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_max_attempts: self.poll_max_attempts.unwrap_or(DEFAULT_POLL_MAX_ATTEMPTS),
            news_page_size: self.news_page_size.unwrap_or(DEFAULT_NEWS_PAGE_SIZE),
            news_rate_limit: self.news_rate_limit.unwrap_or(DEFAULT_NEWS_RATE_LIMIT),
            news_tool_name: self
                .news_tool_name
                .unwrap_or_else(|| DEFAULT_NEWS_TOOL_NAME.to_string()),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        settings.validate()?;
        Ok(settings)
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
