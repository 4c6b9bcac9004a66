//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the blockso binary.

mod asset;
mod commands;
mod config;

pub use asset::fetch_asset;
pub use commands::{Cli, Commands};
pub use config::{load_config, show_config};
