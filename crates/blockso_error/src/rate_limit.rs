//! Rate limiting error types.

/// Error conditions raised by the rate limiting layer.
///
/// Throttled (HTTP 429) responses are handled inside the dispatcher and are
/// not errors; these variants cover misconfiguration and the optional retry cap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Quota or window was zero.
    #[display(
        "Invalid quota: max_requests={} window_ms={} (both must be positive)",
        max_requests,
        window_ms
    )]
    InvalidQuota {
        /// Requested quota per window
        max_requests: u32,
        /// Requested window length in milliseconds
        window_ms: u64,
    },
    /// Upstream kept answering 429 past the configured retry cap.
    #[display("Still rate limited after {} attempts", attempts)]
    RetriesExhausted {
        /// Number of calls issued, all answered with 429
        attempts: usize,
    },
}

/// Rate limiting error with location tracking.
///
/// # Examples
///
/// ```
/// use blockso_error::{RateLimitError, RateLimitErrorKind};
///
/// let err = RateLimitError::new(RateLimitErrorKind::InvalidQuota {
///     max_requests: 0,
///     window_ms: 1000,
/// });
/// assert!(format!("{}", err).contains("max_requests=0"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new RateLimitError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RateLimitErrorKind {
        &self.kind
    }
}

impl From<RateLimitErrorKind> for RateLimitError {
    #[track_caller]
    fn from(kind: RateLimitErrorKind) -> Self {
        Self::new(kind)
    }
}
