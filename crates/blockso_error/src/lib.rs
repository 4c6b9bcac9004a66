//! Error types for the Blockso API client.
//!
//! This crate provides the foundation error types shared by the rate limiter,
//! the upstream API clients and the CLI.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use blockso_error::{BlocksoResult, HttpError};
//!
//! fn fetch_asset() -> BlocksoResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch_asset().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod json;
mod opensea;
mod rate_limit;

pub use config::ConfigError;
pub use error::{BlocksoError, BlocksoErrorKind, BlocksoResult};
pub use http::HttpError;
pub use json::JsonError;
pub use opensea::{OpenseaError, OpenseaErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
