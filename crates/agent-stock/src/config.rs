//! Configuration for the stock analysis team

use crate::error::{Result, StockError};
use agent_utils::{env_parse, env_string, proxy_url};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Language the agents answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    English,
    /// Simplified Chinese
    #[default]
    Chinese,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Parse a code or common name; unknown values yield `None`
    ///
    /// ```
    /// use agent_stock::Language;
    ///
    /// assert_eq!(Language::from_code("EN"), Some(Language::English));
    /// assert_eq!(Language::from_code("中文"), Some(Language::Chinese));
    /// assert_eq!(Language::from_code("ja"), None);
    /// ```
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "zh" | "chinese" | "中文" | "zh-cn" | "zh-hans" => Some(Language::Chinese),
            _ => None,
        }
    }
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Model used by every agent
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Search key used by the task analysis agent
    pub task_search_api_key: Option<String>,

    /// Search key used by the search agent
    pub search_api_key: Option<String>,

    /// Directory charts and reports are written to
    pub output_dir: PathBuf,

    /// Answer language
    pub language: Language,

    /// Turn budget of one team run
    pub max_turns: usize,

    /// Days of daily history fetched per analysis
    pub history_days: i64,

    /// Timeout for fetching a result page
    pub page_fetch_timeout: Duration,

    /// Pause between result page fetches
    pub page_fetch_delay: Duration,

    /// Search API calls allowed per minute
    pub search_requests_per_minute: u32,

    /// How long search responses are cached
    pub search_cache_ttl: Duration,

    /// Outbound HTTP proxy
    pub proxy: Option<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            task_search_api_key: None,
            search_api_key: None,
            output_dir: PathBuf::from("./output"),
            language: Language::default(),
            max_turns: 5,
            history_days: 365,
            page_fetch_timeout: Duration::from_secs(10),
            page_fetch_delay: Duration::from_secs(1),
            search_requests_per_minute: 30,
            search_cache_ttl: Duration::from_secs(300),
            proxy: None,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Read the configuration from the environment
    ///
    /// Unset variables keep their defaults; malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(model) = env_string("MODEL_NAME") {
            builder = builder.model(model);
        }
        if let Some(key) = env_string("Task_API_KEY") {
            builder = builder.task_search_api_key(key);
        }
        if let Some(key) = env_string("Search_API_KEY") {
            builder = builder.search_api_key(key);
        }
        if let Some(dir) = env_string("OUTPUT_DIR") {
            builder = builder.output_dir(dir);
        }
        if let Some(raw) = env_string("AGENT_LANGUAGE") {
            let language = Language::from_code(&raw).ok_or_else(|| {
                StockError::ConfigError(format!("AGENT_LANGUAGE must be en or zh, got {raw:?}"))
            })?;
            builder = builder.language(language);
        }
        if let Some(turns) = env_parse::<usize>("MAX_TURNS")? {
            builder = builder.max_turns(turns);
        }
        if let Some(proxy) = proxy_url()? {
            builder = builder.proxy(proxy);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(StockError::ConfigError(
                "max_turns must be greater than 0".to_string(),
            ));
        }
        if self.history_days < 1 {
            return Err(StockError::ConfigError(
                "history_days must be at least 1".to_string(),
            ));
        }
        if self.search_requests_per_minute == 0 {
            return Err(StockError::ConfigError(
                "search_requests_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Directory charts are written to
    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    /// Directory reports are written to
    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    task_search_api_key: Option<String>,
    search_api_key: Option<String>,
    output_dir: Option<PathBuf>,
    language: Option<Language>,
    max_turns: Option<usize>,
    history_days: Option<i64>,
    page_fetch_timeout: Option<Duration>,
    page_fetch_delay: Option<Duration>,
    search_requests_per_minute: Option<u32>,
    search_cache_ttl: Option<Duration>,
    proxy: Option<String>,
}

impl StockConfigBuilder {
    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the task analysis agent's search key
    pub fn task_search_api_key(mut self, key: impl Into<String>) -> Self {
        self.task_search_api_key = Some(key.into());
        self
    }

    /// Set the search agent's search key
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the answer language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set the turn budget
    pub fn max_turns(mut self, turns: usize) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Set the history window in days
    pub fn history_days(mut self, days: i64) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the page fetch timeout
    pub fn page_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.page_fetch_timeout = Some(timeout);
        self
    }

    /// Set the pause between page fetches
    pub fn page_fetch_delay(mut self, delay: Duration) -> Self {
        self.page_fetch_delay = Some(delay);
        self
    }

    /// Set the search API rate limit
    pub fn search_requests_per_minute(mut self, limit: u32) -> Self {
        self.search_requests_per_minute = Some(limit);
        self
    }

    /// Set the search cache lifetime
    pub fn search_cache_ttl(mut self, ttl: Duration) -> Self {
        self.search_cache_ttl = Some(ttl);
        self
    }

    /// Route outbound requests through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            task_search_api_key: self.task_search_api_key,
            search_api_key: self.search_api_key,
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            language: self.language.unwrap_or(defaults.language),
            max_turns: self.max_turns.unwrap_or(defaults.max_turns),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            page_fetch_timeout: self.page_fetch_timeout.unwrap_or(defaults.page_fetch_timeout),
            page_fetch_delay: self.page_fetch_delay.unwrap_or(defaults.page_fetch_delay),
            search_requests_per_minute: self
                .search_requests_per_minute
                .unwrap_or(defaults.search_requests_per_minute),
            search_cache_ttl: self.search_cache_ttl.unwrap_or(defaults.search_cache_ttl),
            proxy: self.proxy,
        };

        config.validate()?;
        Ok(config)
    }
}
