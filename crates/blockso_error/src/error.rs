//! Top-level error wrapper types.

use crate::{ConfigError, HttpError, JsonError, OpenseaError, RateLimitError};

/// Every error condition a Blockso operation can surface.
///
/// # Examples
///
/// ```
/// use blockso_error::{BlocksoError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: BlocksoError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BlocksoErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Rate limiting error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Opensea client error
    #[from(OpenseaError)]
    Opensea(OpenseaError),
}

/// Blockso error with kind discrimination.
///
/// # Examples
///
/// ```
/// use blockso_error::{BlocksoErrorKind, BlocksoResult, ConfigError};
///
/// fn might_fail() -> BlocksoResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), BlocksoErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Blockso Error: {}", _0)]
pub struct BlocksoError(Box<BlocksoErrorKind>);

impl BlocksoError {
    /// Create a new error from a kind.
    pub fn new(kind: BlocksoErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BlocksoErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to BlocksoErrorKind
impl<T> From<T> for BlocksoError
where
    T: Into<BlocksoErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Blockso operations.
pub type BlocksoResult<T> = std::result::Result<T, BlocksoError>;
