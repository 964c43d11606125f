//! Minimum-interval request spacing for a single remote endpoint family.
//!
//! Each component that talks to a remote service owns one [`RateLimiter`].
//! The search UI and the REST API are throttled independently.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::CoreError;

/// Default spacing for search-page navigations.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_secs(1);

/// Default spacing for REST API lookups.
///
/// Keyless Semantic Scholar allows ~100 requests per 5 minutes, so one request
/// every 3 seconds.
pub const DEFAULT_API_DELAY: Duration = Duration::from_secs(3);

/// Enforces a minimum interval between successive requests.
///
/// The last-request instant starts empty and is only ever moved forward; it is
/// never reset for the lifetime of the limiter.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter. `None` disables spacing entirely.
    pub fn new(min_interval: Option<Duration>) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }

    /// Sleep until the minimum interval has elapsed since the last recorded
    /// request. Returns immediately if no request has been recorded yet.
    pub fn wait(&self) {
        let last = *self.lock();
        self.sleep_remaining(last);
    }

    /// Record "now" as the last request instant.
    pub fn mark(&self) {
        *self.lock() = Some(Instant::now());
    }

    /// Wait and mark as one critical section, immediately before a request.
    ///
    /// Concurrent callers are serialized, so no two requests through the same
    /// limiter are ever issued closer than the minimum interval.
    pub fn acquire(&self) {
        let mut last = self.lock();
        self.sleep_remaining(*last);
        *last = Some(Instant::now());
    }

    fn sleep_remaining(&self, last: Option<Instant>) {
        let (Some(interval), Some(last)) = (self.min_interval, last) else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed < interval {
            let remaining = interval - elapsed;
            tracing::debug!(waited_ms = remaining.as_millis() as u64, "rate limit wait");
            std::thread::sleep(remaining);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        // The guarded value is a plain timestamp, so a poisoned lock is still usable.
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Some(DEFAULT_API_DELAY))
    }
}

/// Check if an HTTP response is a 429 and extract Retry-After if present.
///
/// Returns `Err(CoreError::RateLimited { .. })` if 429, `Ok(())` otherwise.
pub fn check_rate_limit_response(resp: &reqwest::blocking::Response) -> Result<(), CoreError> {
    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        Err(CoreError::RateLimited { retry_after })
    } else {
        Ok(())
    }
}

/// Parse a Retry-After header value (seconds or HTTP-date).
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    // Try parsing as integer seconds first
    if let Ok(secs) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    // HTTP-date (e.g. "Wed, 21 Oct 2015 07:28:00 GMT"): use a conservative fallback
    if value.contains(',') || value.contains("GMT") {
        return Some(Duration::from_secs(5));
    }
    None
}
