//! HTTP client for the Opensea asset endpoint.

use crate::Asset;
use blockso_error::{BlocksoResult, OpenseaError, OpenseaErrorKind};
use blockso_rate_limit::{ApiConfig, DispatchError, ThrottledDispatcher};
use reqwest::{Client, Response};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Header carrying the Opensea API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// Rate-limited Opensea API client.
///
/// Cloning is cheap and clones share the HTTP connection pool and the throttle.
///
/// # Example
///
/// ```no_run
/// use blockso_opensea::OpenseaClient;
/// use blockso_rate_limit::BlocksoConfig;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BlocksoConfig::load()?;
/// let api = config.get_api(OpenseaClient::API_NAME).unwrap();
/// let client = OpenseaClient::new(&api, None)?;
///
/// let asset = client
///     .get_asset("0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb", "1", &CancellationToken::new())
///     .await?;
/// println!("{:?}", asset.image_thumbnail_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenseaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    dispatcher: ThrottledDispatcher,
}

impl OpenseaClient {
    /// Name of the Opensea section in the configuration.
    pub const API_NAME: &'static str = "opensea";

    /// Create a client from its configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &ApiConfig, api_key: Option<String>) -> BlocksoResult<Self> {
        Self::from_section(Self::API_NAME, config, api_key)
    }

    /// Create a client from the configuration section `name`, such as a
    /// mirror of the Opensea API.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new). Validation errors name `apis.<name>`.
    #[instrument(skip(config, api_key), fields(base_url = %config.base_url))]
    pub fn from_section(
        name: &str,
        config: &ApiConfig,
        api_key: Option<String>,
    ) -> BlocksoResult<Self> {
        config.validate(name)?;

        let client = Client::builder()
            .user_agent(concat!("blockso/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenseaError::new(OpenseaErrorKind::ClientCreation(e.to_string())))?;

        let dispatcher = config.throttled_dispatcher()?;
        debug!(has_api_key = api_key.is_some(), "Created Opensea client");

        Ok(Self::with_dispatcher(
            client,
            &config.base_url,
            api_key,
            dispatcher,
        ))
    }

    /// Create a client around an existing HTTP client and dispatcher.
    ///
    /// Use this to share one throttle between several clients of the same upstream.
    pub fn with_dispatcher(
        client: Client,
        base_url: &str,
        api_key: Option<String>,
        dispatcher: ThrottledDispatcher,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            dispatcher,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The throttle and retry policy applied to every request.
    pub fn dispatcher(&self) -> &ThrottledDispatcher {
        &self.dispatcher
    }

    /// URL of a single asset.
    pub fn asset_url(&self, contract_address: &str, token_id: &str) -> String {
        format!("{}/asset/{}/{}/", self.base_url, contract_address, token_id)
    }

    /// Fetch an asset and return the raw response.
    ///
    /// The response is never a 429. Any other status, success or not, is
    /// returned for the caller to inspect.
    ///
    /// # Errors
    ///
    /// - `OpenseaErrorKind::Cancelled` if `cancel` fires first
    /// - `OpenseaErrorKind::Request` if the request fails in transport
    /// - `OpenseaErrorKind::RateLimited` if a retry cap is configured and reached
    #[instrument(skip(self, cancel))]
    pub async fn get_asset_response(
        &self,
        contract_address: &str,
        token_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Response, OpenseaError> {
        let url = self.asset_url(contract_address, token_id);
        cancellable(cancel, self.send(&url)).await
    }

    /// Fetch and decode an asset.
    ///
    /// # Errors
    ///
    /// As [`get_asset_response`](Self::get_asset_response), plus
    /// `OpenseaErrorKind::Status` for a non-success status and
    /// `OpenseaErrorKind::Parse` for an undecodable body.
    #[instrument(skip(self, cancel))]
    pub async fn get_asset(
        &self,
        contract_address: &str,
        token_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Asset, OpenseaError> {
        let url = self.asset_url(contract_address, token_id);

        cancellable(cancel, async {
            let response = self.send(&url).await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(OpenseaError::new(OpenseaErrorKind::Status {
                    status_code: status.as_u16(),
                    message,
                }));
            }

            response
                .json::<Asset>()
                .await
                .map_err(|e| OpenseaError::new(OpenseaErrorKind::Parse(e.to_string())))
        })
        .await
    }

    /// GET `url` through the throttle, retrying on 429.
    async fn send(&self, url: &str) -> Result<Response, OpenseaError> {
        debug!(url, "Sending Opensea request");

        self.dispatcher
            .dispatch(|| {
                let mut request = self.client.get(url);
                if let Some(key) = &self.api_key {
                    request = request.header(API_KEY_HEADER, key);
                }
                request.send()
            })
            .await
            .map_err(|err| match err {
                DispatchError::Call(e) => {
                    OpenseaError::new(OpenseaErrorKind::Request(e.to_string()))
                }
                DispatchError::Exhausted(e) => {
                    OpenseaError::new(OpenseaErrorKind::RateLimited(e.kind().to_string()))
                }
            })
    }
}

/// Run `operation` unless `cancel` fires first.
///
/// Cancellation drops the operation, aborting any throttle wait, retry sleep
/// or in-flight request.
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T, OpenseaError>>,
) -> Result<T, OpenseaError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Opensea request cancelled");
            Err(OpenseaError::new(OpenseaErrorKind::Cancelled))
        }
        result = operation => result,
    }
}
