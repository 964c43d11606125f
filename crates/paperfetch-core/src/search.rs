//! Title/author search through the Semantic Scholar web UI.

use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::browser::{BrowserError, HeadlessBrowser};
use crate::config::Config;
use crate::matching::candidate_matches;
use crate::rate_limit::RateLimiter;
use crate::{CoreError, Result};

/// Container that appears once the results page has rendered.
pub const RESULTS_CONTAINER: &str = ".result-page";

/// One result row.
pub const RESULT_ROW: &str = "div.cl-paper-row";

static AUTHOR_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[data-heap-id='heap_author_list_item']").unwrap());

/// A search result row that has not been confirmed as the queried paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub title: String,
    /// Empty when the row lists no author.
    pub first_author: String,
    /// Canonical Semantic Scholar id, if the row links to a paper page.
    pub paper_id: Option<String>,
}

/// Drives a browser session against the search UI.
///
/// The session is reused across searches; every navigation goes through this
/// agent's own [`RateLimiter`].
pub struct SearchAgent {
    browser: Box<dyn HeadlessBrowser>,
    base_url: String,
    limiter: RateLimiter,
    render_timeout: Duration,
}

impl SearchAgent {
    pub fn new(browser: Box<dyn HeadlessBrowser>, config: &Config) -> Self {
        Self {
            browser,
            base_url: config.search_base_url.clone(),
            limiter: RateLimiter::new(config.search_delay),
            render_timeout: config.render_timeout,
        }
    }

    /// Id of the top-ranked result, with no matching applied.
    pub fn search_best(&mut self, title: &str, first_author: Option<&str>) -> Result<Option<String>> {
        let query = build_query(title, first_author);
        let Some(rows) = self.load_results(&query)? else {
            return Ok(None);
        };

        let paper_id = rows
            .first()
            .and_then(|row| parse_candidate(row))
            .and_then(|c| c.paper_id);

        if let Some(ref id) = paper_id {
            tracing::info!(query = %query, paper_id = %id, "best search result");
        }
        Ok(paper_id)
    }

    /// Id of the first result, in display order, whose title and first author
    /// both match the query.
    pub fn search_exact(&mut self, title: &str, first_author: &str) -> Result<Option<String>> {
        let query = build_query(title, Some(first_author));
        let Some(rows) = self.load_results(&query)? else {
            return Ok(None);
        };

        for row in &rows {
            let Some(candidate) = parse_candidate(row) else {
                continue;
            };
            let Some(paper_id) = candidate.paper_id.as_deref() else {
                continue;
            };
            if candidate_matches(title, first_author, &candidate) {
                tracing::info!(query = %query, paper_id = %paper_id, "exact search match");
                return Ok(Some(paper_id.to_string()));
            }
            tracing::debug!(
                found_title = %candidate.title,
                found_author = %candidate.first_author,
                "search candidate rejected"
            );
        }

        Ok(None)
    }

    /// Navigate to the results page and snapshot every result row.
    ///
    /// `Ok(None)` when the page never renders or has no rows. The two are
    /// indistinguishable to callers.
    fn load_results(&mut self, query: &str) -> Result<Option<Vec<String>>> {
        let url = build_search_url(&self.base_url, query)?;

        self.limiter.acquire();
        tracing::debug!(endpoint = "search", url = %url, "navigating");
        self.browser.navigate(&url)?;

        let rows = self
            .browser
            .wait_for_selector(RESULTS_CONTAINER, self.render_timeout)
            .and_then(|()| self.browser.query_all(RESULT_ROW));

        match rows {
            Ok(rows) if rows.is_empty() => Ok(None),
            Ok(rows) => Ok(Some(rows)),
            Err(BrowserError::Timeout { .. }) | Err(BrowserError::NoSuchElement(_)) => {
                tracing::debug!(query, "no search results rendered");
                Ok(None)
            }
            Err(e) => Err(CoreError::Browser(e)),
        }
    }
}

/// Title followed by the author when one is given.
fn build_query(title: &str, first_author: Option<&str>) -> String {
    format!("{} {}", title, first_author.unwrap_or("")).trim().to_string()
}

/// `{base}/search?q={query}&sort=relevance`, form-encoded.
pub fn build_search_url(base_url: &str, query: &str) -> Result<String> {
    let endpoint = format!("{}/search", base_url.trim_end_matches('/'));
    reqwest::Url::parse_with_params(&endpoint, &[("q", query), ("sort", "relevance")])
        .map(String::from)
        .map_err(|e| CoreError::Config(format!("invalid search URL {}: {}", endpoint, e)))
}

/// Extract title, first author and paper id from a result row's outer HTML.
///
/// Returns `None` when the row has no title link.
pub fn parse_candidate(row_html: &str) -> Option<SearchCandidate> {
    let fragment = Html::parse_fragment(row_html);
    let row = fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .next()?;

    // The title link is a direct child of the row; nested links are author/venue links.
    let link = row
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")?;

    let first_author = row
        .select(&AUTHOR_SEL)
        .next()
        .map(collapse_text)
        .unwrap_or_default();

    Some(SearchCandidate {
        title: collapse_text(link),
        first_author,
        paper_id: link.value().attr("href").and_then(paper_id_from_href),
    })
}

/// The last non-empty path segment of a result link.
pub fn paper_id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or("");
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|seg| !seg.is_empty())
        .map(String::from)
}

fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
