use std::time::Duration;

use crate::rate_limit::{DEFAULT_API_DELAY, DEFAULT_SEARCH_DELAY};

pub const DEFAULT_API_BASE_URL: &str = "https://api.semanticscholar.org";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.semanticscholar.org";
pub const DEFAULT_ARXIV_ABS_BASE: &str = "https://arxiv.org/abs";

/// Desktop Chrome user agent presented by search browser sessions.
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// How long to wait for the search results page to render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a resolver and its components.
#[derive(Clone)]
pub struct Config {
    /// REST API host, without a trailing path.
    pub api_base_url: String,
    /// Web UI host used for searches.
    pub search_base_url: String,
    /// Prefix for derived arXiv abstract-page URLs.
    pub arxiv_abs_base: String,
    /// Minimum spacing between REST lookups. `None` disables it.
    pub api_delay: Option<Duration>,
    /// Minimum spacing between search-page navigations. `None` disables it.
    pub search_delay: Option<Duration>,
    pub render_timeout: Duration,
    pub http_timeout_secs: u64,
    /// Sent as `x-api-key` on REST lookups when set.
    pub s2_api_key: Option<String>,
    /// Sent by the REST and landing-page clients.
    pub user_agent: String,
    /// Presented by the search browser session. `None` keeps the browser's own.
    pub browser_user_agent: Option<String>,
}

impl Config {
    /// Same configuration with both request delays turned off.
    pub fn without_delays(self) -> Self {
        Self {
            api_delay: None,
            search_delay: None,
            ..self
        }
    }

    /// User agent for search navigations, falling back to `user_agent`.
    pub fn search_user_agent(&self) -> &str {
        self.browser_user_agent.as_deref().unwrap_or(&self.user_agent)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("search_base_url", &self.search_base_url)
            .field("arxiv_abs_base", &self.arxiv_abs_base)
            .field("api_delay", &self.api_delay)
            .field("search_delay", &self.search_delay)
            .field("render_timeout", &self.render_timeout)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("s2_api_key", &self.s2_api_key.as_ref().map(|_| "***"))
            .field("user_agent", &self.user_agent)
            .field("browser_user_agent", &self.browser_user_agent)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            arxiv_abs_base: DEFAULT_ARXIV_ABS_BASE.to_string(),
            api_delay: Some(DEFAULT_API_DELAY),
            search_delay: Some(DEFAULT_SEARCH_DELAY),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            http_timeout_secs: 30,
            s2_api_key: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            browser_user_agent: Some(DEFAULT_BROWSER_USER_AGENT.to_string()),
        }
    }
}
