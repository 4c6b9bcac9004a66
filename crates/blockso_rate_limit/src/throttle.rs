//! Pre-emptive throttling in front of outbound requests.

use crate::{GcraThrottle, TokenBucket};
use async_trait::async_trait;

/// Holds requests back before they reach the upstream.
///
/// Implementations count every successful wait against their quota.
#[async_trait]
pub trait Throttle: Send + Sync {
    /// Wait until one more request may be issued.
    async fn until_ready(&self);

    /// Claim a request slot without waiting. Returns false if none is free.
    fn try_ready(&self) -> bool;
}

#[async_trait]
impl Throttle for TokenBucket {
    async fn until_ready(&self) {
        self.acquire_slot().await;
    }

    fn try_ready(&self) -> bool {
        self.try_acquire_slot()
    }
}

#[async_trait]
impl Throttle for GcraThrottle {
    async fn until_ready(&self) {
        self.limiter().until_ready().await;
    }

    fn try_ready(&self) -> bool {
        self.limiter().check().is_ok()
    }
}
