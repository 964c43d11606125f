//! Scripted browser double for tests and offline use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BrowserError, HeadlessBrowser, select_outer_html};

/// A hand-rolled [`HeadlessBrowser`] that serves canned pages.
///
/// Supports:
/// - Pages keyed by exact URL, with an optional fallback page for any other URL.
/// - A page that never renders (every wait times out).
/// - A driver failure on navigation.
/// - A shared log of every navigated URL via [`navigations()`](ScriptedBrowser::navigations).
pub struct ScriptedBrowser {
    pages: HashMap<String, String>,
    fallback: Option<String>,
    current: Option<String>,
    fail_navigation: Option<String>,
    navigations: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fallback: None,
            current: None,
            fail_navigation: None,
            navigations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `html` when `url` is navigated to.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Serve `html` for any URL without its own page.
    pub fn with_fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = Some(html.into());
        self
    }

    /// Make every navigation fail with a driver error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_navigation = Some(message.into());
        self
    }

    /// Handle to the navigation log; stays valid after the browser is moved.
    pub fn navigations(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.navigations)
    }

    fn current(&self) -> Result<&str, BrowserError> {
        self.current
            .as_deref()
            .ok_or_else(|| BrowserError::Driver("no page loaded".into()))
    }
}

impl Default for ScriptedBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBrowser for ScriptedBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(url.to_string());

        if let Some(msg) = &self.fail_navigation {
            return Err(BrowserError::Driver(msg.clone()));
        }

        // An unknown URL loads a blank page, like a browser showing nothing useful.
        self.current = Some(
            self.pages
                .get(url)
                .or(self.fallback.as_ref())
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string()),
        );
        Ok(())
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        if select_outer_html(self.current()?, selector)?.is_empty() {
            return Err(BrowserError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }
        Ok(())
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        select_outer_html(self.current()?, selector)
    }
}
