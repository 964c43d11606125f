//! Headless browser capability used by the search agent.
//!
//! The search agent only needs three operations from a browser session:
//! navigate, wait for a selector to render, and snapshot matching elements.
//! Element snapshots are returned as outer HTML and parsed locally, so the
//! same extraction code runs against a real browser and a test double.

#[cfg(feature = "chromium")]
pub mod chromium;
pub mod mock;

use std::time::Duration;

use scraper::{Html, Selector};
use thiserror::Error;

use crate::CoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },
    #[error("no element matches `{0}`")]
    NoSuchElement(String),
    #[error("browser driver error: {0}")]
    Driver(String),
}

/// A browser session that can render pages and be queried with CSS selectors.
///
/// A session is owned by one search agent and used serially.
pub trait HeadlessBrowser: Send {
    /// Load `url` in the session, replacing the current page.
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Block until at least one element matches `selector`, or fail with
    /// [`BrowserError::Timeout`] once `timeout` has passed.
    fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
    -> Result<(), BrowserError>;

    /// Outer HTML of every element matching `selector`, in document order.
    fn query_all(&mut self, selector: &str) -> Result<Vec<String>, BrowserError>;
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::Driver(format!("invalid selector `{}`: {:?}", selector, e)))
}

/// Outer HTML of every element in `html` matching `selector`.
pub(crate) fn select_outer_html(html: &str, selector: &str) -> Result<Vec<String>, BrowserError> {
    let sel = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&sel).map(|el| el.html()).collect())
}

/// A script-less browser: fetches the page over HTTP and queries the markup
/// as served.
///
/// Nothing renders after load, so `wait_for_selector` answers immediately:
/// the selector is either in the document or it never will be.
pub struct HttpBrowser {
    client: reqwest::blocking::Client,
    document: Option<String>,
}

impl HttpBrowser {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            document: None,
        })
    }

    fn document(&self) -> Result<&str, BrowserError> {
        self.document
            .as_deref()
            .ok_or_else(|| BrowserError::Driver("no page loaded".into()))
    }
}

impl HeadlessBrowser for HttpBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.document = None;
        let resp = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .map_err(|e| BrowserError::Driver(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BrowserError::Driver(format!("HTTP {} from {}", status, url)));
        }

        let body = resp.text().map_err(|e| BrowserError::Driver(e.to_string()))?;
        self.document = Some(body);
        Ok(())
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        if select_outer_html(self.document()?, selector)?.is_empty() {
            return Err(BrowserError::Timeout {
                selector: selector.to_string(),
                waited: Duration::ZERO,
            });
        }
        Ok(())
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        select_outer_html(self.document()?, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="result-page">
          <div class="cl-paper-row"><a href="/paper/a">First</a></div>
          <div class="cl-paper-row"><a href="/paper/b">Second</a></div>
        </div>
    </body></html>"#;

    #[test]
    fn select_returns_outer_html_in_order() {
        let rows = select_outer_html(PAGE, "div.cl-paper-row").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("<div class=\"cl-paper-row\">"));
        assert!(rows[0].contains("First"));
        assert!(rows[1].contains("Second"));
    }

    #[test]
    fn select_no_match_is_empty() {
        assert!(select_outer_html(PAGE, "span.missing").unwrap().is_empty());
    }

    #[test]
    fn invalid_selector_is_driver_error() {
        assert!(matches!(
            select_outer_html(PAGE, "div[["),
            Err(BrowserError::Driver(_))
        ));
    }

    #[test]
    fn http_browser_requires_a_page() {
        let mut browser = HttpBrowser::new("test", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            browser.query_all("div"),
            Err(BrowserError::Driver(_))
        ));
    }

    #[test]
    fn http_browser_serves_fetched_markup() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/search")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .create();

        let mut browser = HttpBrowser::new("test", Duration::from_secs(5)).unwrap();
        browser.navigate(&format!("{}/search", server.url())).unwrap();
        browser
            .wait_for_selector(".result-page", Duration::from_secs(1))
            .unwrap();
        assert_eq!(browser.query_all("div.cl-paper-row").unwrap().len(), 2);
        assert!(matches!(
            browser.wait_for_selector(".never-rendered", Duration::from_secs(1)),
            Err(BrowserError::Timeout { .. })
        ));
    }

    #[test]
    fn http_browser_non_success_is_driver_error() {
        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/search").with_status(503).create();

        let mut browser = HttpBrowser::new("test", Duration::from_secs(5)).unwrap();
        let err = browser
            .navigate(&format!("{}/search", server.url()))
            .unwrap_err();
        assert!(matches!(err, BrowserError::Driver(_)));
    }
}
