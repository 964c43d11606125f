//! REST metadata lookups plus figure/table scraping from the landing page.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::config::Config;
use crate::identifier::{PaperIdentifier, arxiv_abs_url};
use crate::rate_limit::{RateLimiter, check_rate_limit_response};
use crate::{CoreError, PaperRecord, Result};

/// Images in the landing page's figure carousel.
static FIGURE_IMG_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li > a > figure > div > img").unwrap());

const FIGURE_MARKER: &str = "-Figure";
const TABLE_MARKER: &str = "-Table";

/// Paper payload from `/v1/paper/{id}`. Only the fields we keep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperResponse {
    paper_id: String,
    title: String,
    #[serde(default)]
    authors: Vec<AuthorResponse>,
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    venue: Option<String>,
    url: String,
    #[serde(default)]
    arxiv_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorResponse {
    name: Option<String>,
}

/// Fetches paper metadata by identifier.
///
/// Holds one HTTP client per host: the API client is throttled by this
/// fetcher's [`RateLimiter`], the landing-page client is not.
pub struct MetadataFetcher {
    api: reqwest::blocking::Client,
    pages: reqwest::blocking::Client,
    api_base_url: String,
    arxiv_abs_base: String,
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl MetadataFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let build = || {
            reqwest::blocking::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.http_timeout())
                .build()
                .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {}", e)))
        };

        Ok(Self {
            api: build()?,
            pages: build()?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            arxiv_abs_base: config.arxiv_abs_base.clone(),
            api_key: config.s2_api_key.clone(),
            limiter: RateLimiter::new(config.api_delay),
        })
    }

    /// Fetch once, retrying a single time on any error.
    ///
    /// The retry is unconditional: transient and permanent failures get the
    /// same treatment. If the retry fails too, its error is returned.
    pub fn fetch_with_retry(&self, id: &PaperIdentifier) -> Result<Option<PaperRecord>> {
        match self.fetch(id) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "fetch failed, retrying once");
                self.fetch(id)
            }
        }
    }

    /// Look up a paper. `Ok(None)` when the API answers 404.
    pub fn fetch(&self, id: &PaperIdentifier) -> Result<Option<PaperRecord>> {
        let url = format!("{}{}", self.api_base_url, id.api_path());

        let mut req = self.api.get(&url);
        if let Some(ref key) = self.api_key {
            req = req.header("x-api-key", key);
        }

        self.limiter.acquire();
        tracing::debug!(endpoint = "api", url = %url, "fetching paper");
        let resp = req.send()?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(id = %id, "paper not found");
            return Ok(None);
        }
        check_rate_limit_response(&resp)?;
        if !status.is_success() {
            return Err(CoreError::Status { url, status });
        }

        let body = resp.text()?;
        let data: PaperResponse = serde_json::from_str(&body)
            .map_err(|e| CoreError::Malformed(format!("{} from {}", e, url)))?;

        let (figure_urls, table_urls) = self.fetch_assets(&data.url)?;
        let arxiv_id = data.arxiv_id.filter(|a| !a.trim().is_empty());
        let arxiv_url = arxiv_abs_url(&self.arxiv_abs_base, arxiv_id.as_deref());

        Ok(Some(PaperRecord {
            id: data.paper_id,
            title: data.title,
            authors: data.authors.into_iter().filter_map(|a| a.name).collect(),
            abstract_text: data.abstract_text,
            year: data.year,
            venue: data.venue.filter(|v| !v.trim().is_empty()),
            url: data.url,
            arxiv_id,
            arxiv_url,
            figure_urls,
            table_urls,
        }))
    }

    /// Scrape figure and table image URLs from a paper's landing page.
    ///
    /// Not rate limited: the landing page lives on a different host.
    pub fn fetch_assets(&self, page_url: &str) -> Result<(Vec<String>, Vec<String>)> {
        tracing::debug!(endpoint = "page", url = %page_url, "fetching landing page");
        let resp = self.pages.get(page_url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Status {
                url: page_url.to_string(),
                status,
            });
        }
        let html = resp.text()?;
        Ok(classify_assets(&html))
    }
}

/// Split landing-page images into (figures, tables) by their `src`, keeping
/// document order. Images that are neither are dropped.
pub fn classify_assets(html: &str) -> (Vec<String>, Vec<String>) {
    let document = Html::parse_document(html);
    let mut figures = Vec::new();
    let mut tables = Vec::new();

    for img in document.select(&FIGURE_IMG_SEL) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if src.contains(FIGURE_MARKER) {
            figures.push(src.to_string());
        } else if src.contains(TABLE_MARKER) {
            tables.push(src.to_string());
        }
    }

    (figures, tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"<html><body>
        <ul class="figure-list">
          <li><a href="/f1"><figure><div><img src="https://figures.example/abc/1-Figure1-1.png"></div></figure></a></li>
          <li><a href="/t1"><figure><div><img src="https://figures.example/abc/5-Table1-1.png"></div></figure></a></li>
          <li><a href="/f2"><figure><div><img src="https://figures.example/abc/3-Figure2-1.png"></div></figure></a></li>
          <li><a href="/x"><figure><div><img src="https://figures.example/abc/logo.png"></div></figure></a></li>
        </ul>
        <img src="https://figures.example/abc/9-Figure9-1.png">
    </body></html>"#;

    #[test]
    fn classifies_figures_and_tables_in_order() {
        let (figures, tables) = classify_assets(LANDING);
        assert_eq!(
            figures,
            vec![
                "https://figures.example/abc/1-Figure1-1.png",
                "https://figures.example/abc/3-Figure2-1.png",
            ]
        );
        assert_eq!(tables, vec!["https://figures.example/abc/5-Table1-1.png"]);
    }

    #[test]
    fn images_outside_the_carousel_are_ignored() {
        let (figures, _) = classify_assets(LANDING);
        assert!(!figures.iter().any(|f| f.contains("Figure9")));
    }

    #[test]
    fn page_without_images() {
        let (figures, tables) = classify_assets("<html><body><p>nothing</p></body></html>");
        assert!(figures.is_empty());
        assert!(tables.is_empty());
    }

    #[test]
    fn payload_with_nulls_deserializes() {
        let data: PaperResponse = serde_json::from_str(
            r#"{
                "paperId": "abc",
                "title": "T",
                "authors": [{"name": "A"}, {"name": null}],
                "abstract": null,
                "year": null,
                "venue": "",
                "url": "https://www.semanticscholar.org/paper/abc",
                "arxivId": null,
                "citations": []
            }"#,
        )
        .unwrap();
        assert_eq!(data.paper_id, "abc");
        assert_eq!(data.authors.len(), 2);
        assert!(data.abstract_text.is_none());
        assert!(data.arxiv_id.is_none());
    }

    #[test]
    fn payload_missing_required_field_fails() {
        assert!(serde_json::from_str::<PaperResponse>(r#"{"title": "T"}"#).is_err());
    }
}
