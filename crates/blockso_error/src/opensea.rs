//! Opensea client error types.

/// Opensea-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OpenseaErrorKind {
    /// Failed to build the HTTP client
    #[display("Failed to create Opensea client: {}", _0)]
    ClientCreation(String),
    /// Request failed before a response arrived
    #[display("Opensea request failed: {}", _0)]
    Request(String),
    /// Request was cancelled by the caller
    #[display("Opensea request cancelled")]
    Cancelled,
    /// Non-success HTTP status (never 429, which is retried)
    #[display("HTTP {} error: {}", status_code, message)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// Response body was not a valid asset document
    #[display("Failed to parse Opensea response: {}", _0)]
    Parse(String),
    /// Retry cap reached while throttled
    #[display("Opensea rate limit: {}", _0)]
    RateLimited(String),
}

/// Opensea error with source location tracking.
///
/// # Examples
///
/// ```
/// use blockso_error::{OpenseaError, OpenseaErrorKind};
///
/// let err = OpenseaError::new(OpenseaErrorKind::Cancelled);
/// assert!(err.is_cancelled());
/// assert!(format!("{}", err).contains("cancelled"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Opensea Error: {} at line {} in {}", kind, line, file)]
pub struct OpenseaError {
    /// The kind of error that occurred
    pub kind: OpenseaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl OpenseaError {
    /// Create a new OpenseaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OpenseaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &OpenseaErrorKind {
        &self.kind
    }

    /// True when the caller cancelled the request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, OpenseaErrorKind::Cancelled)
    }
}
