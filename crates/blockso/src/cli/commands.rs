//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blockso - rate-limited access to the third-party APIs behind the Blockso client
#[derive(Parser, Debug)]
#[command(name = "blockso")]
#[command(about = "Rate-limited access to the third-party APIs behind the Blockso client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch an asset from Opensea
    Asset {
        /// Token contract address
        contract: String,

        /// Token id within the contract
        token_id: String,

        /// Configuration section to use
        #[arg(long, default_value = "opensea")]
        api: String,

        /// Print the asset as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective rate limit configuration
    Config {
        /// Only print this API's section
        #[arg(long)]
        api: Option<String>,
    },
}
