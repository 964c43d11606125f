use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod authors;
pub mod browser;
pub mod config;
pub mod config_file;
pub mod fetcher;
pub mod identifier;
pub mod matching;
pub mod rate_limit;
pub mod resolver;
pub mod search;

// Re-export for convenience
pub use browser::{BrowserError, HeadlessBrowser, HttpBrowser};
pub use config::Config;
pub use fetcher::MetadataFetcher;
pub use identifier::{PaperIdentifier, trim_version};
pub use rate_limit::RateLimiter;
pub use resolver::PaperResolver;
pub use search::{SearchAgent, SearchCandidate};

/// Metadata for a single paper as returned by a successful lookup.
///
/// Records fetched through different routes (archive id, canonical id,
/// search) for the same paper compare equal field-for-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Semantic Scholar paper id.
    pub id: String,
    pub title: String,
    /// Author display names in byline order.
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<u32>,
    pub venue: Option<String>,
    /// Landing page on semanticscholar.org.
    pub url: String,
    pub arxiv_id: Option<String>,
    pub arxiv_url: Option<String>,
    pub figure_urls: Vec<String>,
    pub table_urls: Vec<String>,
}

impl PaperRecord {
    /// First author's display name, if the record lists any.
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("rate limited (429){}", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("configuration error: {0}")]
    Config(String),
}

fn retry_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(", retry after {:.1}s", d.as_secs_f64()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
