use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub search: Option<SearchConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub s2_api_key: Option<String>,
    /// Seconds between REST lookups; 0 disables spacing.
    pub delay_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    /// Seconds between search navigations; 0 disables spacing.
    pub delay_secs: Option<f64>,
    pub render_timeout_secs: Option<u64>,
    /// User agent for the search browser session.
    pub browser_user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Platform config directory path: `<config_dir>/paperfetch/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperfetch").join("config.toml"))
}

/// Load config by cascading CWD `.paperfetch.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperfetch.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_api = base.api.unwrap_or_default();
    let base_search = base.search.unwrap_or_default();
    let base_http = base.http.unwrap_or_default();
    let api = overlay.api.unwrap_or_default();
    let search = overlay.search.unwrap_or_default();
    let http = overlay.http.unwrap_or_default();

    ConfigFile {
        api: Some(ApiConfig {
            base_url: api.base_url.or(base_api.base_url),
            s2_api_key: api.s2_api_key.or(base_api.s2_api_key),
            delay_secs: api.delay_secs.or(base_api.delay_secs),
        }),
        search: Some(SearchConfig {
            base_url: search.base_url.or(base_search.base_url),
            delay_secs: search.delay_secs.or(base_search.delay_secs),
            render_timeout_secs: search.render_timeout_secs.or(base_search.render_timeout_secs),
            browser_user_agent: search.browser_user_agent.or(base_search.browser_user_agent),
        }),
        http: Some(HttpConfig {
            timeout_secs: http.timeout_secs.or(base_http.timeout_secs),
            user_agent: http.user_agent.or(base_http.user_agent),
        }),
    }
}

/// Non-positive delays disable spacing, as do values too large to represent.
pub fn delay_from_secs(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

impl ConfigFile {
    /// Layer file values over `config`; fields absent from the file are kept.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(api) = &self.api {
            if let Some(url) = &api.base_url {
                config.api_base_url = url.clone();
            }
            if let Some(key) = &api.s2_api_key {
                config.s2_api_key = Some(key.clone());
            }
            if let Some(secs) = api.delay_secs {
                config.api_delay = delay_from_secs(secs);
            }
        }
        if let Some(search) = &self.search {
            if let Some(url) = &search.base_url {
                config.search_base_url = url.clone();
            }
            if let Some(secs) = search.delay_secs {
                config.search_delay = delay_from_secs(secs);
            }
            if let Some(secs) = search.render_timeout_secs {
                config.render_timeout = Duration::from_secs(secs);
            }
            if let Some(ua) = &search.browser_user_agent {
                config.browser_user_agent = Some(ua.clone());
            }
        }
        if let Some(http) = &self.http {
            if let Some(secs) = http.timeout_secs {
                config.http_timeout_secs = secs;
            }
            if let Some(ua) = &http.user_agent {
                config.user_agent = ua.clone();
            }
        }
        config
    }
}
