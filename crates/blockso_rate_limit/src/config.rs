//! Configuration structures for upstream API rate limits.
//!
//! This module provides TOML-based configuration. Sources, in increasing
//! precedence:
//! - Bundled defaults (include_str! from blockso.toml)
//! - User config in home directory (~/.config/blockso/blockso.toml)
//! - User config in current directory (./blockso.toml)

use crate::{GcraThrottle, RetryingDispatcher, Throttle, ThrottledDispatcher, TokenBucket};
use blockso_error::{BlocksoError, BlocksoResult, ConfigError, RateLimitError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

fn default_fallback_retry_after_secs() -> u64 {
    1
}

/// Which throttle guards an API.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThrottleKind {
    /// Fixed window counter, reset one window after its first request.
    #[default]
    FixedWindow,
    /// Evenly spaced requests (GCRA) with a burst of `max_requests`.
    Gcra,
}

/// Rate limit settings for one upstream API.
///
/// ```toml
/// [apis.opensea]
/// base_url = "https://api.opensea.io/api/v1"
/// max_requests = 4
/// window_ms = 1000
/// throttle = "fixed_window"
/// fallback_retry_after_secs = 1
/// max_retries = 10   # optional, unbounded when absent
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL requests are built from
    pub base_url: String,

    /// Requests allowed per window
    pub max_requests: u32,

    /// Window length in milliseconds
    pub window_ms: u64,

    /// Throttle algorithm
    #[serde(default)]
    pub throttle: ThrottleKind,

    /// Wait in seconds when a 429 has no usable Retry-After header
    #[serde(default = "default_fallback_retry_after_secs")]
    pub fallback_retry_after_secs: u64,

    /// Retry cap on 429 responses (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<usize>,
}

impl ApiConfig {
    /// Window as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Fallback wait as a duration.
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_secs(self.fallback_retry_after_secs)
    }

    /// Reject settings that make throttling meaningless.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the quota or window is zero, or the base URL is empty.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::new(format!(
                "apis.{}.max_requests must be positive",
                name
            )));
        }
        if self.window_ms == 0 {
            return Err(ConfigError::new(format!(
                "apis.{}.window_ms must be positive",
                name
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "apis.{}.base_url must not be empty",
                name
            )));
        }
        Ok(())
    }

    /// Build a fixed-window bucket from these settings.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidQuota` if the quota or window is zero.
    pub fn token_bucket(&self) -> Result<TokenBucket, RateLimitError> {
        TokenBucket::new(self.max_requests, self.window())
    }

    /// Build the configured throttle.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidQuota` if the quota or window is zero.
    pub fn build_throttle(&self) -> Result<Arc<dyn Throttle>, RateLimitError> {
        Ok(match self.throttle {
            ThrottleKind::FixedWindow => Arc::new(self.token_bucket()?),
            ThrottleKind::Gcra => Arc::new(GcraThrottle::new(self.max_requests, self.window())?),
        })
    }

    /// Build the 429 retry policy.
    pub fn dispatcher(&self) -> RetryingDispatcher {
        RetryingDispatcher::new()
            .with_fallback_delay(self.fallback_delay())
            .with_max_retries(self.max_retries)
    }

    /// Build the throttle and retry policy together.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidQuota` if the quota or window is zero.
    pub fn throttled_dispatcher(&self) -> Result<ThrottledDispatcher, RateLimitError> {
        Ok(ThrottledDispatcher::new(
            self.build_throttle()?,
            self.dispatcher(),
        ))
    }
}

/// Top-level Blockso configuration.
///
/// # Example
///
/// ```no_run
/// use blockso_rate_limit::BlocksoConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BlocksoConfig::load()?;
/// let opensea = config.get_api("opensea").unwrap();
/// println!("Opensea quota: {} per {} ms", opensea.max_requests, opensea.window_ms);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct BlocksoConfig {
    /// Map of API name to its rate limit settings
    #[serde(default)]
    pub apis: HashMap<String, ApiConfig>,
}

impl BlocksoConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> BlocksoResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                BlocksoError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                BlocksoError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or fails validation.
    #[instrument]
    pub fn load() -> BlocksoResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../blockso.toml");

        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/blockso/blockso.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("blockso").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                BlocksoError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                BlocksoError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every configured API.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.apis
            .iter()
            .try_for_each(|(name, api)| api.validate(name))
    }

    /// Settings for one API by name.
    #[instrument(skip(self))]
    pub fn get_api(&self, name: &str) -> Option<ApiConfig> {
        debug!(name, "Looking up API configuration");
        self.apis.get(name).cloned()
    }
}
