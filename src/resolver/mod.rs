// =============================================================================
// Resolver — cached, tiered lookups behind every API view
// =============================================================================
//
// Each public method follows the same read-through shape:
//
//   1. derive a deterministic cache key from the request parameters,
//   2. return the cached view on a hit,
//   3. on a miss run the provider chain, normalise, store with the view's TTL.
//
// Provider failures never escape: every tier either yields data or hands over
// to the next tier, ending in mock or synthetic data. Concurrent misses on the
// same key each run the chain; the cache keeps the last write.
// =============================================================================

mod detail;
mod history;
mod lists;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::error;

use crate::cache::{CachedView, TtlCache};
use crate::config::AppConfig;
use crate::providers::{BudgetSnapshot, CryptoMarketProvider, QuoteProvider, StockListProvider};
use crate::types::{RankingCriterion, UsListing};

/// Default ordered symbol list for the regional (Indonesian) stock view.
pub const DEFAULT_INDO_SYMBOLS: [&str; 10] = [
    "BBCA.JK", "BBRI.JK", "TLKM.JK", "ASII.JK", "BMRI.JK", "BBNI.JK", "GOTO.JK", "BYAN.JK",
    "AMRT.JK", "UNVR.JK",
];

/// Errors that reach the HTTP layer. Provider failures are not among them.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// A cache key held a view of the wrong kind.
    #[error("unexpected cached value under key '{key}'")]
    UnexpectedCacheEntry { key: String },
}

/// Ranking and TTL policy for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverPolicy {
    pub crypto_ranking: RankingCriterion,
    pub us_listing: UsListing,
    pub indo_ranking: RankingCriterion,
    pub indo_symbols: Vec<String>,
    /// Stop querying regional symbols once this many quotes succeeded.
    pub indo_max_results: usize,
    pub list_ttl: Duration,
    pub live_ttl: Duration,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            crypto_ranking: RankingCriterion::Volume,
            us_listing: UsListing::MostActive,
            indo_ranking: RankingCriterion::Volume,
            indo_symbols: DEFAULT_INDO_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            indo_max_results: 10,
            list_ttl: Duration::from_secs(5 * 60),
            live_ttl: Duration::from_secs(60),
        }
    }
}

impl ResolverPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            crypto_ranking: config.crypto_ranking,
            us_listing: config.us_listing,
            indo_ranking: config.indo_ranking,
            indo_symbols: config.indo_symbols.clone(),
            indo_max_results: config.indo_max_results,
            list_ttl: Duration::from_secs(config.list_ttl_secs),
            live_ttl: Duration::from_secs(config.live_ttl_secs),
        }
    }
}

/// Tiered, cached market-data lookups. Cheap to share behind an `Arc`.
pub struct Resolver {
    cache: Arc<TtlCache<CachedView>>,
    crypto: Arc<dyn CryptoMarketProvider>,
    quotes: Arc<dyn QuoteProvider>,
    stocks: Arc<dyn StockListProvider>,
    policy: ResolverPolicy,
}

impl Resolver {
    pub fn new(
        cache: Arc<TtlCache<CachedView>>,
        crypto: Arc<dyn CryptoMarketProvider>,
        quotes: Arc<dyn QuoteProvider>,
        stocks: Arc<dyn StockListProvider>,
        policy: ResolverPolicy,
    ) -> Self {
        Self {
            cache,
            crypto,
            quotes,
            stocks,
            policy,
        }
    }

    pub fn stock_budget(&self) -> Option<BudgetSnapshot> {
        self.stocks.budget()
    }

    fn unexpected(&self, key: &str) -> ResolveError {
        error!(key, "cache entry holds a different view kind");
        ResolveError::UnexpectedCacheEntry {
            key: key.to_string(),
        }
    }
}

/// Trim and upper-case a requested symbol, rejecting blanks.
fn normalize_symbol(symbol: &str) -> Result<String, ResolveError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(ResolveError::EmptySymbol);
    }
    Ok(symbol.to_uppercase())
}

/// `0` means "no limit".
fn take_limit(limit: usize) -> usize {
    if limit == 0 {
        usize::MAX
    } else {
        limit
    }
}
