//! Retry-After aware dispatch of single HTTP calls.
//!
//! The dispatcher runs a caller-supplied call and inspects the response. A
//! `429 Too Many Requests` is never handed back: the dispatcher sleeps for the
//! server-dictated `Retry-After` delay and calls again, for as long as the
//! upstream keeps throttling (or until the optional retry cap is hit). Any
//! other response is returned as-is, and a failed call (transport error,
//! cancellation) propagates immediately without a retry.
//!
//! ```text
//! DISPATCHING --429--> WAITING --sleep--> DISPATCHING ... --not 429--> DONE
//!      \--call failed--> error (no retry)
//! ```

use crate::{RateLimitedResponse, Throttle};
use blockso_error::{RateLimitError, RateLimitErrorKind};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Wait applied when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_secs(1);

/// Failure of a dispatched call.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DispatchError<E> {
    /// The call itself failed; the error is passed through untouched.
    #[display("{_0}")]
    Call(E),
    /// The retry cap was reached while the upstream still answered 429.
    #[display("{_0}")]
    Exhausted(RateLimitError),
}

impl<E> DispatchError<E> {
    /// The call error, if that is what this is.
    pub fn into_call_error(self) -> Option<E> {
        match self {
            DispatchError::Call(err) => Some(err),
            DispatchError::Exhausted(_) => None,
        }
    }
}

/// Calls an upstream and retries whenever it answers 429.
///
/// By default retries are unbounded and each waits exactly what the server
/// asked for. There is no backoff growth.
///
/// # Example
///
/// ```rust,ignore
/// use blockso_rate_limit::RetryingDispatcher;
///
/// let dispatcher = RetryingDispatcher::default();
/// let response = dispatcher
///     .dispatch(|| client.get("https://api.opensea.io/api/v1/asset/0xabc/1/").send())
///     .await?;
/// assert_ne!(response.status().as_u16(), 429);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryingDispatcher {
    fallback_delay: Duration,
    max_retries: Option<usize>,
}

impl Default for RetryingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryingDispatcher {
    /// Unbounded retries with a one second fallback delay.
    pub fn new() -> Self {
        Self {
            fallback_delay: DEFAULT_FALLBACK_DELAY,
            max_retries: None,
        }
    }

    /// Set the wait used when a 429 has a missing or invalid `Retry-After`.
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Cap the number of retries after the first attempt. `None` is unbounded.
    pub fn with_max_retries(mut self, max_retries: Option<usize>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait used when a 429 has no usable `Retry-After`.
    pub fn fallback_delay(&self) -> Duration {
        self.fallback_delay
    }

    /// Retry cap, if any.
    pub fn max_retries(&self) -> Option<usize> {
        self.max_retries
    }

    /// Call `api_call` until it yields a response other than 429.
    ///
    /// `api_call` must issue exactly one request per invocation.
    ///
    /// # Errors
    ///
    /// - `DispatchError::Call` as soon as `api_call` fails. It is not retried.
    /// - `DispatchError::Exhausted` when a retry cap is set and every allowed
    ///   attempt was throttled.
    #[instrument(skip_all, fields(max_retries = ?self.max_retries))]
    pub async fn dispatch<F, Fut, R, E>(&self, api_call: F) -> Result<R, DispatchError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: RateLimitedResponse,
    {
        self.run(None, api_call).await
    }

    /// The retry loop. When `throttle` is set, every attempt waits for it
    /// before `api_call` is invoked.
    async fn run<F, Fut, R, E>(
        &self,
        throttle: Option<&dyn Throttle>,
        mut api_call: F,
    ) -> Result<R, DispatchError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: RateLimitedResponse,
    {
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            if let Some(throttle) = throttle {
                throttle.until_ready().await;
            }

            let response = match api_call().await {
                Ok(response) => response,
                Err(err) => {
                    debug!(attempt, "Call failed, not retrying");
                    return Err(DispatchError::Call(err));
                }
            };

            if !response.is_rate_limited() {
                debug!(attempt, status = response.status_code(), "Call completed");
                return Ok(response);
            }

            if self.max_retries.is_some_and(|max| attempt > max) {
                warn!(attempt, "Rate limited and out of retries");
                return Err(DispatchError::Exhausted(RateLimitError::new(
                    RateLimitErrorKind::RetriesExhausted { attempts: attempt },
                )));
            }

            let delay = match response.retry_after() {
                Some(delay) => delay,
                None => {
                    warn!(
                        header = ?response.header(crate::RETRY_AFTER),
                        fallback_ms = crate::duration_ms(self.fallback_delay),
                        "429 without a usable Retry-After, using fallback delay"
                    );
                    self.fallback_delay
                }
            };

            warn!(attempt, delay_ms = crate::duration_ms(delay), "Rate limited, retrying");
            tokio::time::sleep(delay).await;
        }
    }
}

/// A [`RetryingDispatcher`] whose every attempt first passes a [`Throttle`].
///
/// Each retry re-acquires from the throttle, so retries count against the
/// local quota like any other request.
#[derive(Clone)]
pub struct ThrottledDispatcher {
    throttle: Arc<dyn Throttle>,
    dispatcher: RetryingDispatcher,
}

impl fmt::Debug for ThrottledDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledDispatcher")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl ThrottledDispatcher {
    /// Compose a throttle with a dispatcher.
    pub fn new(throttle: Arc<dyn Throttle>, dispatcher: RetryingDispatcher) -> Self {
        Self {
            throttle,
            dispatcher,
        }
    }

    /// The throttle consulted before every attempt.
    pub fn throttle(&self) -> &Arc<dyn Throttle> {
        &self.throttle
    }

    /// The retry policy.
    pub fn dispatcher(&self) -> &RetryingDispatcher {
        &self.dispatcher
    }

    /// Throttle, then dispatch `api_call` with 429 retries.
    ///
    /// `api_call` is only invoked once the throttle has granted a slot, on
    /// the first attempt and on every retry.
    ///
    /// # Errors
    ///
    /// Same as [`RetryingDispatcher::dispatch`].
    #[instrument(skip_all, fields(max_retries = ?self.dispatcher.max_retries))]
    pub async fn dispatch<F, Fut, R, E>(&self, api_call: F) -> Result<R, DispatchError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: RateLimitedResponse,
    {
        self.dispatcher
            .run(Some(self.throttle.as_ref()), api_call)
            .await
    }
}
