//! Upstream market-data providers.
//!
//! The resolver only knows the traits below; the concrete HTTP clients are
//! wired in at startup and replaced by fakes in tests.

pub mod alpha_vantage;
pub mod coingecko;
pub mod error;
pub mod models;
pub mod rate_limit;

use async_trait::async_trait;

pub use alpha_vantage::AlphaVantageClient;
pub use coingecko::CoinGeckoClient;
pub use error::ProviderError;
pub use models::{CoinMarketRow, GlobalQuote, StockListingRow};
pub use rate_limit::BudgetSnapshot;

use crate::types::UsListing;

/// Source of the crypto market list.
#[async_trait]
pub trait CryptoMarketProvider: Send + Sync {
    /// Short identifier used in log lines.
    fn id(&self) -> &'static str;

    /// Fetch the upstream market rows in whatever order upstream returns them.
    async fn fetch_markets(&self) -> Result<Vec<CoinMarketRow>, ProviderError>;
}

/// Source of single-symbol stock quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Latest quote for `symbol`. An unknown symbol is
    /// [`ProviderError::NotFound`].
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote, ProviderError>;
}

/// Source of ranked US stock lists.
#[async_trait]
pub trait StockListProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Ranked rows, best first. Upstream ordering is trusted.
    async fn ranked_listing(
        &self,
        listing: UsListing,
    ) -> Result<Vec<StockListingRow>, ProviderError>;

    /// Budget state for the health endpoint, if the provider tracks one.
    fn budget(&self) -> Option<BudgetSnapshot> {
        None
    }
}
