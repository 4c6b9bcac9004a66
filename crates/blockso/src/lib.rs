//! Blockso - rate-limited access to third-party APIs
//!
//! Blockso's client calls third-party APIs (Opensea for token images) that
//! enforce a per-second quota and answer 429 when it is exceeded. This crate
//! re-exports the pieces that make those calls safe:
//!
//! - `blockso_error` - Error types
//! - `blockso_rate_limit` - Fixed-window bucket, GCRA throttle, 429 retry dispatcher, configuration
//! - `blockso_opensea` - Opensea asset client
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use blockso::{BlocksoConfig, OpenseaClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BlocksoConfig::load()?;
//!     let api = config.get_api(OpenseaClient::API_NAME).unwrap();
//!     let client = OpenseaClient::new(&api, None)?;
//!
//!     let asset = client.get_asset("0xabc", "1", &CancellationToken::new()).await?;
//!     println!("{:?}", asset.image_url());
//!     Ok(())
//! }
//! ```

pub use blockso_error::*;
pub use blockso_opensea::*;
pub use blockso_rate_limit::*;

pub mod logging;
