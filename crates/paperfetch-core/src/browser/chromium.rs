//! Headless Chrome session over the DevTools protocol.
//!
//! chromiumoxide is async; the session owns a current-thread tokio runtime
//! and blocks on it so callers see the same synchronous interface as every
//! other [`HeadlessBrowser`]. The CDP handler task only makes progress while
//! one of our `block_on` calls is running, which is the only time it is needed.

use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use super::{BrowserError, HeadlessBrowser};

/// Interval between DOM polls while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ChromiumBrowser {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch a headless Chrome with one reusable tab.
    pub fn launch(user_agent: Option<&str>) -> Result<Self, BrowserError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BrowserError::Driver(format!("failed to start runtime: {}", e)))?;

        let mut builder = BrowserConfig::builder();
        if let Some(ua) = user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }
        let config = builder.build().map_err(BrowserError::Driver)?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(config))
            .map_err(driver_error)?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(driver_error)?;

        tracing::debug!("launched headless Chrome");
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
        })
    }
}

fn driver_error(e: chromiumoxide::error::CdpError) -> BrowserError {
    BrowserError::Driver(e.to_string())
}

impl HeadlessBrowser for ChromiumBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        let page = &self.page;
        self.runtime
            .block_on(async { page.goto(url).await.map(|_| ()) })
            .map_err(driver_error)
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let page = &self.page;
        let deadline = Instant::now() + timeout;
        self.runtime.block_on(async {
            loop {
                // Lookup errors mean "not there yet" while the page is rendering.
                if let Ok(found) = page.find_elements(selector).await
                    && !found.is_empty()
                {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(BrowserError::Timeout {
                        selector: selector.to_string(),
                        waited: timeout,
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let page = &self.page;
        self.runtime.block_on(async {
            let elements = page
                .find_elements(selector)
                .await
                .map_err(|_| BrowserError::NoSuchElement(selector.to_string()))?;
            let mut out = Vec::with_capacity(elements.len());
            for el in elements {
                if let Some(html) = el.outer_html().await.map_err(driver_error)? {
                    out.push(html);
                }
            }
            Ok(out)
        })
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.block_on(self.browser.close()) {
            tracing::warn!(error = %e, "failed to close headless Chrome");
        }
        self.handler.abort();
    }
}
