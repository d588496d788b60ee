// =============================================================================
// Fallback data — fixed mock lists and the synthetic last-resort detail
// =============================================================================
//
// Served with the same schema as live data. Provenance is only visible in the
// `source` field of the resolver's log lines.
// =============================================================================

use crate::numeric::format_2dp;
use crate::types::{AssetDetail, NormalizedAsset, Region};

/// Placeholder volume for synthetic details.
pub const SYNTHETIC_VOLUME: &str = "10,000,000";

fn mock_asset(symbol: &str, name: &str, price: &str, change: &str) -> NormalizedAsset {
    NormalizedAsset {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        change_percent_24h: change.to_string(),
        high: None,
        low: None,
        volume: None,
    }
}

fn truncate(mut list: Vec<NormalizedAsset>, limit: usize) -> Vec<NormalizedAsset> {
    if limit > 0 {
        list.truncate(limit);
    }
    list
}

/// Fixed crypto dataset. Not stablecoin-filtered.
pub fn mock_crypto(limit: usize) -> Vec<NormalizedAsset> {
    truncate(
        vec![
            mock_asset("BTC", "Bitcoin", "91200", "1.2"),
            mock_asset("ETH", "Ethereum", "2600", "-0.5"),
            mock_asset("USDT", "Tether", "1.00", "0.01"),
        ],
        limit,
    )
}

/// Fixed stock dataset for `region`.
pub fn mock_stocks(region: Region, limit: usize) -> Vec<NormalizedAsset> {
    let list = match region {
        Region::Us => vec![
            mock_asset("TSLA", "TSLA", "240.12", "-2.34"),
            mock_asset("NVDA", "NVDA", "134.50", "4.56"),
            mock_asset("AAPL", "AAPL", "220.67", "1.12"),
        ],
        Region::Indo => vec![
            mock_asset("BBRI.JK", "BBRI.JK", "4560", "0.89"),
            mock_asset("BBCA.JK", "BBCA.JK", "10250", "1.23"),
            mock_asset("TLKM.JK", "TLKM.JK", "2890", "-0.54"),
        ],
    };
    truncate(list, limit)
}

/// Deterministic placeholder detail: price is `150 + 10 × len(symbol)`.
pub fn synthetic_detail(symbol: &str) -> AssetDetail {
    let symbol = symbol.trim().to_uppercase();
    let base = 150.0 + 10.0 * symbol.chars().count() as f64;
    AssetDetail {
        name: symbol.clone(),
        symbol,
        price: format_2dp(base),
        change_percent_24h: "1.25".to_string(),
        high: format_2dp(base * 1.05),
        low: format_2dp(base * 0.95),
        volume: SYNTHETIC_VOLUME.to_string(),
        prev_close: format_2dp(base - 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_lists_truncate_to_limit() {
        assert_eq!(mock_crypto(0).len(), 3);
        assert_eq!(mock_crypto(2).len(), 2);
        assert_eq!(mock_crypto(10).len(), 3);
        assert_eq!(mock_crypto(2)[1].symbol, "ETH");
        assert_eq!(mock_stocks(Region::Us, 1)[0].symbol, "TSLA");
        assert_eq!(mock_stocks(Region::Indo, 0)[1].symbol, "BBCA.JK");
    }

    #[test]
    fn synthetic_detail_for_four_letter_symbol() {
        let d = synthetic_detail("zzzz");
        assert_eq!(d.symbol, "ZZZZ");
        assert_eq!(d.price, "190.00");
        assert_eq!(d.high, "199.50");
        assert_eq!(d.low, "180.50");
        assert_eq!(d.prev_close, "188.00");
        assert_eq!(d.change_percent_24h, "1.25");
        assert_eq!(d.volume, SYNTHETIC_VOLUME);
    }
}
