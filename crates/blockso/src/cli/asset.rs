//! Asset lookup command.

use blockso_error::{BlocksoResult, ConfigError, JsonError};
use blockso_opensea::{Asset, OpenseaClient};
use blockso_rate_limit::BlocksoConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Environment variable holding the Opensea API key.
const API_KEY_VAR: &str = "OPENSEA_API_KEY";

/// Fetch one asset and print it. Ctrl-C cancels the request.
#[instrument(skip(config))]
pub async fn fetch_asset(
    config: &BlocksoConfig,
    api: &str,
    contract: &str,
    token_id: &str,
    json: bool,
) -> BlocksoResult<()> {
    let api_config = config
        .get_api(api)
        .ok_or_else(|| ConfigError::new(format!("No configuration for API '{}'", api)))?;

    let client = OpenseaClient::from_section(api, &api_config, std::env::var(API_KEY_VAR).ok())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    let asset = client.get_asset(contract, token_id, &cancel).await?;
    info!(contract, token_id, "Fetched asset");

    if json {
        let rendered =
            serde_json::to_string_pretty(&asset).map_err(|e| JsonError::new(e.to_string()))?;
        println!("{}", rendered);
    } else {
        print_asset(&asset);
    }

    Ok(())
}

fn print_asset(asset: &Asset) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Name:      {}", field(asset.name()));
    println!("Token id:  {}", field(asset.token_id()));
    println!("Image:     {}", field(asset.image_url()));
    println!("Thumbnail: {}", field(asset.image_thumbnail_url()));
    println!("Permalink: {}", field(asset.permalink()));
}
