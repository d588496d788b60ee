// =============================================================================
// List views — crypto, US stocks, regional (Indonesian) stocks
// =============================================================================

use tracing::{debug, info, warn};

use super::{take_limit, ResolveError, Resolver};
use crate::cache::{cache_key, CachedView};
use crate::mock::{mock_crypto, mock_stocks};
use crate::providers::CoinMarketRow;
use crate::types::{NormalizedAsset, RankingCriterion, Region};

const CRYPTO_ENDPOINT: &str = "crypto_prices";
const US_STOCKS_ENDPOINT: &str = "us_stocks";
const INDO_STOCKS_ENDPOINT: &str = "indo_stocks";

/// Pegged coins excluded from live crypto rankings.
const STABLECOINS: [&str; 4] = ["usdt", "usdc", "fdusd", "dai"];

impl Resolver {
    /// Crypto prices ranked by the configured criterion. `limit == 0` is
    /// unlimited.
    pub async fn crypto_prices(
        &self,
        limit: usize,
    ) -> Result<Vec<NormalizedAsset>, ResolveError> {
        let key = cache_key(CRYPTO_ENDPOINT, &[&limit.to_string()]);
        if let Some(list) = self.cached_assets(&key)? {
            return Ok(list);
        }
        let list = self.fetch_crypto(limit).await;
        self.store_assets(key, &list);
        Ok(list)
    }

    /// US stocks in upstream rank order.
    pub async fn us_stocks(&self, limit: usize) -> Result<Vec<NormalizedAsset>, ResolveError> {
        let key = cache_key(US_STOCKS_ENDPOINT, &[&limit.to_string()]);
        if let Some(list) = self.cached_assets(&key)? {
            return Ok(list);
        }
        let list = self.fetch_us_stocks(limit).await;
        self.store_assets(key, &list);
        Ok(list)
    }

    /// Regional stocks built from one quote per configured symbol.
    pub async fn indo_stocks(&self, limit: usize) -> Result<Vec<NormalizedAsset>, ResolveError> {
        let key = cache_key(INDO_STOCKS_ENDPOINT, &[&limit.to_string()]);
        if let Some(list) = self.cached_assets(&key)? {
            return Ok(list);
        }
        let list = self.fetch_indo_stocks(limit).await;
        self.store_assets(key, &list);
        Ok(list)
    }

    // -------------------------------------------------------------------------
    // Uncached provider chains (also used by the detail tiers)
    // -------------------------------------------------------------------------

    pub(super) async fn fetch_crypto(&self, limit: usize) -> Vec<NormalizedAsset> {
        match self.crypto.fetch_markets().await {
            Ok(rows) if !rows.is_empty() => {
                let list = rank_crypto(rows, self.policy.crypto_ranking, limit);
                info!(
                    source = self.crypto.id(),
                    count = list.len(),
                    ranking = %self.policy.crypto_ranking,
                    "crypto list resolved"
                );
                list
            }
            Ok(_) => {
                warn!(
                    source = "mock",
                    provider = self.crypto.id(),
                    "crypto provider returned no rows — using mock data"
                );
                mock_crypto(limit)
            }
            Err(e) => {
                warn!(
                    source = "mock",
                    provider = e.provider(),
                    error = %e,
                    "crypto provider failed — using mock data"
                );
                mock_crypto(limit)
            }
        }
    }

    pub(super) async fn fetch_us_stocks(&self, limit: usize) -> Vec<NormalizedAsset> {
        let listing = self.policy.us_listing;
        match self.stocks.ranked_listing(listing).await {
            Ok(rows) => {
                let list: Vec<NormalizedAsset> = rows
                    .iter()
                    .filter(|r| !r.ticker.trim().is_empty())
                    .take(take_limit(limit))
                    .map(|r| r.to_asset())
                    .collect();
                if list.is_empty() {
                    warn!(
                        source = "mock",
                        %listing,
                        "US listing had no usable rows — using mock data"
                    );
                    return mock_stocks(Region::Us, limit);
                }
                info!(
                    source = self.stocks.id(),
                    %listing,
                    count = list.len(),
                    "US stocks resolved"
                );
                list
            }
            Err(e) => {
                warn!(
                    source = "mock",
                    provider = e.provider(),
                    %listing,
                    error = %e,
                    "US stock provider failed — using mock data"
                );
                mock_stocks(Region::Us, limit)
            }
        }
    }

    pub(super) async fn fetch_indo_stocks(&self, limit: usize) -> Vec<NormalizedAsset> {
        let criterion = self.policy.indo_ranking;
        let max_results = self.policy.indo_max_results.max(1);
        let mut ranked: Vec<(f64, NormalizedAsset)> = Vec::new();

        for symbol in &self.policy.indo_symbols {
            match self.quotes.global_quote(symbol).await {
                Ok(quote) => {
                    let rank = match criterion {
                        RankingCriterion::Volume => quote.volume_f64(),
                        RankingCriterion::Change24h => quote.change_f64(),
                    };
                    ranked.push((rank, quote.to_asset(symbol)));
                }
                Err(e) => debug!(symbol = %symbol, error = %e, "regional quote skipped"),
            }
            if ranked.len() >= max_results {
                break;
            }
        }

        if ranked.is_empty() {
            warn!(source = "mock", "no regional quotes succeeded — using mock data");
            return mock_stocks(Region::Indo, limit);
        }

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        let list: Vec<NormalizedAsset> = ranked
            .into_iter()
            .take(take_limit(limit))
            .map(|(_, asset)| asset)
            .collect();
        info!(
            source = self.quotes.id(),
            count = list.len(),
            ranking = %criterion,
            "regional stocks resolved"
        );
        list
    }

    // -------------------------------------------------------------------------
    // Cache helpers
    // -------------------------------------------------------------------------

    fn cached_assets(&self, key: &str) -> Result<Option<Vec<NormalizedAsset>>, ResolveError> {
        match self.cache.get(key) {
            None => Ok(None),
            Some(CachedView::Assets(list)) => {
                debug!(key, "cache hit");
                Ok(Some(list))
            }
            Some(_) => Err(self.unexpected(key)),
        }
    }

    fn store_assets(&self, key: String, list: &[NormalizedAsset]) {
        self.cache
            .set(key, CachedView::Assets(list.to_vec()), self.policy.list_ttl);
    }
}

/// Drop stablecoins and blank symbols, sort descending by `criterion`, keep
/// the first `limit` entries (0 = all).
pub(crate) fn rank_crypto(
    mut rows: Vec<CoinMarketRow>,
    criterion: RankingCriterion,
    limit: usize,
) -> Vec<NormalizedAsset> {
    let rank = |row: &CoinMarketRow| match criterion {
        RankingCriterion::Volume => row.volume(),
        RankingCriterion::Change24h => row.change_24h(),
    };

    rows.retain(|row| !STABLECOINS.contains(&row.ticker().as_str()));
    rows.sort_by(|a, b| rank(b).total_cmp(&rank(a)));

    rows.iter()
        .filter(|row| !row.ticker().is_empty())
        .take(take_limit(limit))
        .map(CoinMarketRow::to_asset)
        .collect()
}
