//! GCRA throttle backed by `governor`.
//!
//! Where the fixed-window [`TokenBucket`](crate::TokenBucket) lets a full
//! quota through at the start of every window, the GCRA (Generic Cell Rate
//! Algorithm) spaces requests evenly: a burst of `max_requests` is allowed,
//! after which one request is released every `window / max_requests`.

use blockso_error::{RateLimitError, RateLimitErrorKind};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

// Type alias for our direct rate limiter
type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Smoothed rate limiter allowing `max_requests` per `window` on average.
///
/// Clones share the same limiter state.
#[derive(Clone)]
pub struct GcraThrottle {
    limiter: Arc<DirectRateLimiter>,
    max_requests: u32,
    window: Duration,
}

impl std::fmt::Debug for GcraThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcraThrottle")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl GcraThrottle {
    /// Create a throttle allowing a burst of `max_requests`, refilling over `window`.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidQuota` if either value is zero.
    #[instrument]
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        let invalid = || {
            RateLimitError::new(RateLimitErrorKind::InvalidQuota {
                max_requests,
                window_ms: crate::duration_ms(window),
            })
        };

        let burst = NonZeroU32::new(max_requests).ok_or_else(invalid)?;
        let quota = Quota::with_period(window / max_requests)
            .ok_or_else(invalid)?
            .allow_burst(burst);

        debug!(?quota, "Creating GCRA throttle");
        Ok(Self {
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
            max_requests,
            window,
        })
    }

    /// Burst size and requests per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window over which `max_requests` are replenished.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub(crate) fn limiter(&self) -> &DirectRateLimiter {
        &self.limiter
    }
}
