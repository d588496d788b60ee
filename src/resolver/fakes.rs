//! In-memory providers for resolver and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{Resolver, ResolverPolicy};
use crate::cache::{CachedView, TtlCache};
use crate::providers::{
    CoinMarketRow, CryptoMarketProvider, GlobalQuote, ProviderError, QuoteProvider,
    StockListProvider, StockListingRow,
};
use crate::types::UsListing;

const FAKE: &str = "FAKE";

fn outage() -> ProviderError {
    ProviderError::Status {
        provider: FAKE,
        status: 503,
    }
}

pub struct FakeCrypto {
    rows: Option<Vec<CoinMarketRow>>,
    pub calls: AtomicUsize,
}

impl FakeCrypto {
    pub fn ok(rows: Vec<CoinMarketRow>) -> Arc<Self> {
        Arc::new(Self {
            rows: Some(rows),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            rows: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CryptoMarketProvider for FakeCrypto {
    fn id(&self) -> &'static str {
        FAKE
    }

    async fn fetch_markets(&self) -> Result<Vec<CoinMarketRow>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows.clone().ok_or_else(outage)
    }
}

pub struct FakeQuotes {
    quotes: HashMap<String, GlobalQuote>,
    pub calls: AtomicUsize,
}

impl FakeQuotes {
    pub fn with(quotes: Vec<(&str, GlobalQuote)>) -> Arc<Self> {
        Arc::new(Self {
            quotes: quotes
                .into_iter()
                .map(|(s, q)| (s.to_string(), q))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn none() -> Arc<Self> {
        Self::with(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for FakeQuotes {
    fn id(&self) -> &'static str {
        FAKE
    }

    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                provider: FAKE,
                symbol: symbol.to_string(),
            })
    }
}

pub struct FakeStocks {
    rows: Option<Vec<StockListingRow>>,
    pub last_listing: parking_lot::Mutex<Option<UsListing>>,
    pub calls: AtomicUsize,
}

impl FakeStocks {
    pub fn ok(rows: Vec<StockListingRow>) -> Arc<Self> {
        Arc::new(Self {
            rows: Some(rows),
            last_listing: parking_lot::Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            rows: None,
            last_listing: parking_lot::Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockListProvider for FakeStocks {
    fn id(&self) -> &'static str {
        FAKE
    }

    async fn ranked_listing(
        &self,
        listing: UsListing,
    ) -> Result<Vec<StockListingRow>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_listing.lock() = Some(listing);
        self.rows.clone().ok_or_else(outage)
    }
}

pub fn coin(symbol: &str, price: f64, change: f64, volume: f64) -> CoinMarketRow {
    serde_json::from_value(json!({
        "id": symbol.to_lowercase(),
        "symbol": symbol.to_lowercase(),
        "name": format!("{symbol} coin"),
        "current_price": price,
        "price_change_percentage_24h": change,
        "high_24h": price * 1.01,
        "low_24h": price * 0.99,
        "total_volume": volume,
    }))
    .unwrap()
}

pub fn listing(ticker: &str, price: &str, change: &str) -> StockListingRow {
    serde_json::from_value(json!({
        "ticker": ticker,
        "price": price,
        "change_amount": "0",
        "change_percentage": change,
        "volume": "1000",
    }))
    .unwrap()
}

pub fn quote(price: &str, change: &str, volume: &str) -> GlobalQuote {
    serde_json::from_value(json!({
        "05. price": price,
        "03. high": price,
        "04. low": price,
        "06. volume": volume,
        "08. previous close": price,
        "10. change percent": change,
    }))
    .unwrap()
}

pub fn build_resolver(
    crypto: Arc<FakeCrypto>,
    quotes: Arc<FakeQuotes>,
    stocks: Arc<FakeStocks>,
    policy: ResolverPolicy,
) -> (Resolver, Arc<TtlCache<CachedView>>) {
    let cache = Arc::new(TtlCache::new());
    let resolver = Resolver::new(cache.clone(), crypto, quotes, stocks, policy);
    (resolver, cache)
}
