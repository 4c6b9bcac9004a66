//! The slice of an HTTP response the dispatcher needs to see.
//!
//! The dispatcher is decoupled from any particular HTTP library: anything that
//! exposes a status code and a header lookup can be dispatched. An
//! implementation for `reqwest::Response` is provided.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// HTTP status signalling that the upstream quota is exhausted.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Header carrying the server-dictated wait before the next attempt.
pub const RETRY_AFTER: &str = "retry-after";

/// A response that may signal rate limiting.
pub trait RateLimitedResponse {
    /// HTTP status code.
    fn status_code(&self) -> u16;

    /// Case-insensitive header lookup. `None` when absent or not valid text.
    fn header(&self, name: &str) -> Option<&str>;

    /// True for `429 Too Many Requests`.
    fn is_rate_limited(&self) -> bool {
        self.status_code() == TOO_MANY_REQUESTS
    }

    /// Delay requested by the `Retry-After` header.
    ///
    /// `None` when the header is missing or unusable; the caller decides the
    /// fallback.
    fn retry_after(&self) -> Option<Duration> {
        self.header(RETRY_AFTER).and_then(parse_retry_after)
    }
}

impl RateLimitedResponse for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }
}

/// Parse a `Retry-After` header value.
///
/// Accepts a non-negative number of seconds (fractions allowed) or an HTTP-date.
/// A date in the past yields a zero delay. Anything else yields `None`.
///
/// # Example
///
/// ```
/// use blockso_rate_limit::parse_retry_after;
/// use std::time::Duration;
///
/// assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
/// assert_eq!(parse_retry_after("soon"), None);
/// ```
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Duration::try_from_secs_f64(seconds).ok();
        }
        debug!(value, "Retry-After is not a usable number of seconds");
        return None;
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = date.with_timezone(&Utc) - Utc::now();
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}
