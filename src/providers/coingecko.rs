// =============================================================================
// CoinGecko REST client — public `/coins/markets` endpoint
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::error::ProviderError;
use super::models::CoinMarketRow;
use super::CryptoMarketProvider;

const PROVIDER_ID: &str = "COINGECKO";
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Number of coins requested per call.
const PER_PAGE: u32 = 50;

#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build CoinGecko HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "CoinGeckoClient initialised");

        Ok(Self { base_url, client })
    }

    fn markets_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency=usd&order=volume_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url, PER_PAGE
        )
    }
}

#[async_trait]
impl CryptoMarketProvider for CoinGeckoClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    /// GET /coins/markets (public).
    #[instrument(skip(self), name = "coingecko::fetch_markets")]
    async fn fetch_markets(&self) -> Result<Vec<CoinMarketRow>, ProviderError> {
        let resp = self
            .client
            .get(self.markets_url())
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER_ID,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER_ID,
                status: status.as_u16(),
            });
        }

        let rows: Vec<CoinMarketRow> = resp
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER_ID, e))?;

        debug!(count = rows.len(), "coin markets fetched");
        Ok(rows)
    }
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
