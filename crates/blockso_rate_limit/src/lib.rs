//! Rate limiting for calls to third-party HTTP APIs.
//!
//! Upstream APIs such as Opensea enforce a requests-per-second quota and answer
//! `429 Too Many Requests` with a `Retry-After` header once it is exceeded.
//! This crate provides two independent pieces that compose:
//!
//! - [`TokenBucket`]: a fixed-window counter that holds callers back once the
//!   window's quota is spent, so the client avoids *causing* 429s.
//! - [`RetryingDispatcher`]: runs a single HTTP call and, on 429, sleeps for
//!   the server-dictated delay and calls again until a non-429 response arrives.
//!
//! [`ThrottledDispatcher`] wires a [`Throttle`] in front of every attempt of a
//! [`RetryingDispatcher`]. [`GcraThrottle`] is a smoother alternative to the
//! fixed window backed by `governor`.
//!
//! ```rust,ignore
//! use blockso_rate_limit::{RetryingDispatcher, ThrottledDispatcher, TokenBucket};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let bucket = TokenBucket::new(4, Duration::from_millis(1000))?;
//! let dispatcher = ThrottledDispatcher::new(Arc::new(bucket), RetryingDispatcher::default());
//!
//! let response = dispatcher.dispatch(|| client.get(&url).send()).await?;
//! ```

mod bucket;
mod config;
mod dispatcher;
mod gcra;
mod response;
mod throttle;

pub use bucket::{BucketSnapshot, TokenBucket};
pub use config::{ApiConfig, BlocksoConfig, ThrottleKind};
pub use dispatcher::{DEFAULT_FALLBACK_DELAY, DispatchError, RetryingDispatcher, ThrottledDispatcher};
pub use gcra::GcraThrottle;
pub use response::{RETRY_AFTER, RateLimitedResponse, TOO_MANY_REQUESTS, parse_retry_after};
pub use throttle::Throttle;

use std::time::Duration;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }
}
