use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::market_data::types::MarketSnapshot;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam between the poller and the upstream API. The production
/// implementation is [`BrsClient`]; tests substitute a mock.
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError>;
}

/// HTTP adapter for the brsapi.ir market endpoint. The API key is supplied
/// from configuration and sent as a query parameter, never embedded.
pub struct BrsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl BrsClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MarketApi for BrsClient {
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        // Decode via serde_json directly so decode failures are
        // distinguishable from transport failures.
        let body = response.text().await?;
        let snapshot: MarketSnapshot = serde_json::from_str(&body)?;

        debug!(
            gold = snapshot.gold.len(),
            currency = snapshot.currency.len(),
            crypto = snapshot.cryptocurrency.len(),
            "fetched market snapshot"
        );
        Ok(snapshot)
    }
}
