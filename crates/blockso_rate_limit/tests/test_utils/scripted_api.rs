//! Scripted upstream API for dispatcher tests.

#![allow(dead_code)]

use blockso_rate_limit::{RETRY_AFTER, RateLimitedResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Minimal response: a status and an optional Retry-After value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub retry_after: Option<String>,
}

impl StubResponse {
    pub fn ok() -> Self {
        Self::status(200)
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
        }
    }

    pub fn throttled(retry_after: &str) -> Self {
        Self {
            status: 429,
            retry_after: Some(retry_after.to_string()),
        }
    }

    pub fn throttled_without_header() -> Self {
        Self::status(429)
    }
}

impl RateLimitedResponse for StubResponse {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case(RETRY_AFTER) {
            self.retry_after.as_deref()
        } else {
            None
        }
    }
}

/// Transport failure returned by the scripted API.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("stub failure: {_0}")]
pub struct StubFailure(#[error(not(source))] pub String);

/// What the next call returns.
pub type StubReply = Result<StubResponse, StubFailure>;

/// Upstream that plays back a fixed list of replies and records call times.
///
/// Once the script is exhausted every further call answers 200.
#[derive(Debug, Clone, Default)]
pub struct ScriptedApi {
    replies: Arc<Mutex<VecDeque<StubReply>>>,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedApi {
    pub fn new(replies: impl IntoIterator<Item = StubReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `times` throttled replies followed by a 200.
    pub fn throttled_then_ok(times: usize, retry_after: &str) -> Self {
        Self::new(
            std::iter::repeat_with(|| Ok(StubResponse::throttled(retry_after)))
                .take(times)
                .chain(std::iter::once(Ok(StubResponse::ok()))),
        )
    }

    /// Issue one call.
    pub async fn call(&self) -> StubReply {
        self.calls.lock().unwrap().push(Instant::now());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(StubResponse::ok()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}
