// =============================================================================
// Single-asset detail — four ordered tiers, first success wins
// =============================================================================
//
//   1. crypto list (live or mock)      high/low derived when missing
//   2. direct stock quote              returned as-is
//   3. US stock list (live or mock)    high/low/volume synthesised
//   4. synthetic placeholder           always succeeds
//
// No tier is retried, so a detail lookup never fails on provider errors.
// =============================================================================

use tracing::{debug, info};

use super::{normalize_symbol, ResolveError, Resolver};
use crate::cache::{cache_key, CachedView};
use crate::mock::synthetic_detail;
use crate::numeric::{format_2dp, parse_loose_f64, try_parse_f64};
use crate::types::{AssetDetail, NormalizedAsset};

const DETAIL_ENDPOINT: &str = "asset_detail";

/// Placeholder volume for details built from the US stock list.
const US_LIST_VOLUME: &str = "5,678,900";

impl Resolver {
    pub async fn asset_detail(&self, symbol: &str) -> Result<AssetDetail, ResolveError> {
        let symbol = normalize_symbol(symbol)?;
        let key = cache_key(DETAIL_ENDPOINT, &[&symbol]);

        match self.cache.get(&key) {
            Some(CachedView::Detail(detail)) => {
                debug!(key = %key, "cache hit");
                return Ok(detail);
            }
            Some(_) => return Err(self.unexpected(&key)),
            None => {}
        }

        let detail = self.resolve_detail(&symbol).await;
        self.cache
            .set(key, CachedView::Detail(detail.clone()), self.policy.live_ttl);
        Ok(detail)
    }

    async fn resolve_detail(&self, symbol: &str) -> AssetDetail {
        if let Some(asset) = find_symbol(self.fetch_crypto(0).await, symbol) {
            info!(symbol, source = "crypto_list", "asset detail resolved");
            return detail_from_crypto(asset);
        }

        match self.quotes.global_quote(symbol).await {
            Ok(quote) => {
                info!(symbol, source = self.quotes.id(), "asset detail resolved");
                return quote.to_detail(symbol);
            }
            Err(e) => debug!(symbol, error = %e, "quote tier missed"),
        }

        if let Some(asset) = find_symbol(self.fetch_us_stocks(0).await, symbol) {
            info!(symbol, source = "us_stock_list", "asset detail resolved");
            return detail_from_us_listing(asset);
        }

        info!(symbol, source = "synthetic", "asset detail resolved");
        synthetic_detail(symbol)
    }
}

fn find_symbol(list: Vec<NormalizedAsset>, symbol: &str) -> Option<NormalizedAsset> {
    list.into_iter()
        .find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
}

/// Keep a provider bound only when it reads as a number.
fn numeric_or(value: Option<String>, fallback: f64) -> String {
    value
        .filter(|v| try_parse_f64(v).is_some())
        .unwrap_or_else(|| format_2dp(fallback))
}

/// Tier 1. `prev_close` is approximated by the current price.
fn detail_from_crypto(asset: NormalizedAsset) -> AssetDetail {
    let price = parse_loose_f64(&asset.price);
    AssetDetail {
        high: numeric_or(asset.high, price * 1.05),
        low: numeric_or(asset.low, price * 0.95),
        volume: asset.volume.unwrap_or_default(),
        prev_close: asset.price.clone(),
        symbol: asset.symbol,
        name: asset.name,
        price: asset.price,
        change_percent_24h: asset.change_percent_24h,
    }
}

/// Tier 3. The list carries no range or volume, so both are synthesised.
fn detail_from_us_listing(asset: NormalizedAsset) -> AssetDetail {
    let price = parse_loose_f64(&asset.price);
    AssetDetail {
        high: format_2dp(price * 1.02),
        low: format_2dp(price * 0.98),
        volume: US_LIST_VOLUME.to_string(),
        prev_close: format_2dp(price),
        symbol: asset.symbol,
        name: asset.name,
        price: asset.price,
        change_percent_24h: asset.change_percent_24h,
    }
}
