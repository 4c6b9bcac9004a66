//! Fixed-window request counter.
//!
//! The bucket counts requests issued in the current window. The first request
//! of a window schedules its reset `window` later; once `max_requests` have
//! been issued, further callers sleep a full window and try again. Sleeping a
//! whole window can overshoot the real reset by up to one window, which is
//! acceptable for upstreams that also enforce a fixed window.
//!
//! The reset timer is modelled as a deadline checked on every access rather
//! than a spawned task: the observable behavior is the same and the bucket
//! needs no runtime handle to be created.

use blockso_error::{RateLimitError, RateLimitErrorKind};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Point-in-time view of a bucket's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketSnapshot {
    /// Requests issued in the current window.
    pub count: u32,
    /// Whether a window reset is pending.
    pub window_timer_active: bool,
}

#[derive(Debug, Default)]
struct BucketState {
    count: u32,
    resets_at: Option<Instant>,
}

impl BucketState {
    /// Fire the pending reset if its deadline has passed.
    fn expire(&mut self, now: Instant) {
        if self.resets_at.is_some_and(|at| now >= at) {
            self.count = 0;
            self.resets_at = None;
        }
    }

    fn try_take(&mut self, now: Instant, max_requests: u32, window: Duration) -> bool {
        self.expire(now);

        // Only the first request of a window schedules the reset
        if self.resets_at.is_none() {
            self.resets_at = Some(now + window);
        }

        if self.count >= max_requests {
            return false;
        }

        self.count += 1;
        true
    }
}

/// Fixed-window rate limiter allowing `max_requests` per `window`.
///
/// Clones share the same window, so one bucket built at startup can be handed
/// to every component calling the same upstream.
///
/// # Example
///
/// ```
/// use blockso_rate_limit::TokenBucket;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bucket = TokenBucket::new(4, Duration::from_millis(1000))?;
/// let answer = bucket.acquire(|| async { 42 }).await;
/// assert_eq!(answer, 42);
/// assert_eq!(bucket.snapshot().count, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenBucket {
    max_requests: u32,
    window: Duration,
    state: Arc<Mutex<BucketState>>,
}

impl TokenBucket {
    /// Create a bucket allowing `max_requests` per `window`.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidQuota` if either value is zero.
    #[instrument]
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        if max_requests == 0 || window.is_zero() {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidQuota {
                max_requests,
                window_ms: crate::duration_ms(window),
            }));
        }

        debug!("Creating token bucket");
        Ok(Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(BucketState::default())),
        })
    }

    /// Quota per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `task` once the current window has room for it.
    ///
    /// The task's output (including any error it returns) is passed through
    /// untouched; acquiring never fails.
    pub async fn acquire<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire_slot().await;
        task().await
    }

    /// Wait until a request may be issued, counting it against the window.
    pub async fn acquire_slot(&self) {
        while !self.try_acquire_slot() {
            debug!(
                max_requests = self.max_requests,
                window_ms = crate::duration_ms(self.window),
                "Window quota exhausted, sleeping one window"
            );
            tokio::time::sleep(self.window).await;
        }
    }

    /// Take a slot if one is free, without waiting.
    pub fn try_acquire_slot(&self) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.try_take(now, self.max_requests, self.window)
    }

    /// Current count and timer flag, after firing any overdue reset.
    pub fn snapshot(&self) -> BucketSnapshot {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.expire(now);
        BucketSnapshot {
            count: state.count,
            window_timer_active: state.resets_at.is_some(),
        }
    }
}
