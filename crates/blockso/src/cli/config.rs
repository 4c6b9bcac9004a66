//! Configuration loading and display.

use blockso_error::{BlocksoResult, ConfigError, JsonError};
use blockso_rate_limit::BlocksoConfig;
use std::path::Path;
use tracing::{debug, instrument};

/// Load from `path` if given, otherwise from the default locations.
#[instrument]
pub fn load_config(path: Option<&Path>) -> BlocksoResult<BlocksoConfig> {
    match path {
        Some(path) => BlocksoConfig::from_file(path),
        None => BlocksoConfig::load(),
    }
}

/// Print the configuration, or one API's section, as pretty JSON.
#[instrument(skip(config))]
pub fn show_config(config: &BlocksoConfig, api: Option<&str>) -> BlocksoResult<()> {
    let rendered = match api {
        Some(name) => {
            let section = config
                .get_api(name)
                .ok_or_else(|| ConfigError::new(format!("No configuration for API '{}'", name)))?;
            serde_json::to_string_pretty(&section)
        }
        None => serde_json::to_string_pretty(config),
    }
    .map_err(|e| JsonError::new(e.to_string()))?;

    debug!(bytes = rendered.len(), "Rendered configuration");
    println!("{}", rendered);
    Ok(())
}
