//! Blockso CLI binary.
//!
//! This binary provides command-line access to Blockso's rate-limited API clients:
//! - Fetch Opensea assets through the configured throttle and 429 retry policy
//! - Inspect the effective rate limit configuration

use blockso::logging::{LoggingConfig, init_logging};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, fetch_asset, load_config, show_config};

    // Pick up OPENSEA_API_KEY and RUST_LOG from a local .env
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut logging = LoggingConfig::from_env().with_json_logs(cli.json_logs);
    if cli.verbose {
        logging = logging.with_log_level("debug");
    }
    init_logging(&logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    let config = load_config(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Asset {
            contract,
            token_id,
            api,
            json,
        } => {
            fetch_asset(&config, &api, &contract, &token_id, json).await?;
        }

        Commands::Config { api } => {
            show_config(&config, api.as_deref())?;
        }
    }

    Ok(())
}
