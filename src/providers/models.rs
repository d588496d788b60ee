// =============================================================================
// Upstream row shapes and their normalization
// =============================================================================
//
// Each provider decodes its payload into one of these typed rows, and each row
// converts itself into the canonical `NormalizedAsset` / `AssetDetail`. Fields
// whose upstream type varies (number vs. string vs. null) stay as
// `serde_json::Value` until conversion and go through `numeric`: text that
// does not read as a number becomes `"0"` here and nowhere else. Upstream
// fields the service never reads are not declared.
// =============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::numeric::{
    coerce_f64, display_value, format_number, numeric_text, parse_loose_f64, try_parse_f64,
};
use crate::types::{AssetDetail, NormalizedAsset};

/// One entry of CoinGecko's `/coins/markets` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinMarketRow {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Value,
    #[serde(default)]
    pub price_change_percentage_24h: Value,
    #[serde(default)]
    pub high_24h: Value,
    #[serde(default)]
    pub low_24h: Value,
    #[serde(default)]
    pub total_volume: Value,
}

impl CoinMarketRow {
    /// Lower-cased, trimmed ticker (`""` when missing).
    pub fn ticker(&self) -> String {
        self.symbol
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn volume(&self) -> f64 {
        coerce_f64(&self.total_volume)
    }

    pub fn change_24h(&self) -> f64 {
        coerce_f64(&self.price_change_percentage_24h)
    }

    pub fn to_asset(&self) -> NormalizedAsset {
        NormalizedAsset {
            symbol: self.ticker().to_ascii_uppercase(),
            name: self.name.clone().unwrap_or_default(),
            price: display_value(&self.current_price),
            change_percent_24h: display_value(&self.price_change_percentage_24h),
            high: optional_bound(&self.high_24h),
            low: optional_bound(&self.low_24h),
            volume: optional_display(&self.total_volume),
        }
    }
}

/// One entry of Alpha Vantage's `TOP_GAINERS_LOSERS` lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockListingRow {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub change_percentage: Value,
    #[serde(default)]
    pub volume: Value,
}

impl StockListingRow {
    pub fn to_asset(&self) -> NormalizedAsset {
        let symbol = self.ticker.trim().to_ascii_uppercase();
        NormalizedAsset {
            name: symbol.clone(),
            symbol,
            price: display_value(&self.price),
            change_percent_24h: format_number(coerce_f64(&self.change_percentage)),
            high: None,
            low: None,
            volume: optional_display(&self.volume),
        }
    }
}

/// The `"Global Quote"` object of Alpha Vantage's `GLOBAL_QUOTE` function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "03. high", default)]
    pub high: String,
    #[serde(rename = "04. low", default)]
    pub low: String,
    #[serde(rename = "05. price", default)]
    pub price: String,
    #[serde(rename = "06. volume", default)]
    pub volume: String,
    #[serde(rename = "08. previous close", default)]
    pub previous_close: String,
    #[serde(rename = "10. change percent", default)]
    pub change_percent: String,
}

impl GlobalQuote {
    /// Alpha Vantage answers unknown symbols with `"Global Quote": {}`.
    pub fn is_empty(&self) -> bool {
        self.price.trim().is_empty()
    }

    pub fn volume_f64(&self) -> f64 {
        parse_loose_f64(&self.volume)
    }

    pub fn change_f64(&self) -> f64 {
        parse_loose_f64(&self.change_percent)
    }

    /// Detail view of a quote. The quote carries no company name, so the
    /// requested symbol stands in for it.
    pub fn to_detail(&self, requested: &str) -> AssetDetail {
        let symbol = requested.trim().to_ascii_uppercase();
        AssetDetail {
            name: symbol.clone(),
            symbol,
            price: numeric_text(&self.price),
            change_percent_24h: numeric_text(&strip_percent(&self.change_percent)),
            high: numeric_text(&self.high),
            low: numeric_text(&self.low),
            volume: numeric_text(&self.volume),
            prev_close: numeric_text(&self.previous_close),
        }
    }

    /// List view of a quote, used by the regional stock endpoint.
    pub fn to_asset(&self, requested: &str) -> NormalizedAsset {
        let symbol = requested.trim().to_ascii_uppercase();
        NormalizedAsset {
            name: symbol.clone(),
            symbol,
            price: numeric_text(&self.price),
            change_percent_24h: format_number(self.change_f64()),
            high: None,
            low: None,
            volume: Some(format_number(self.volume_f64())),
        }
    }
}

fn optional_display(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(display_value(other)),
    }
}

/// A day high/low is only kept when it reads as a number, so the detail view
/// can derive a replacement.
fn optional_bound(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if try_parse_f64(s).is_none() => None,
        other => optional_display(other),
    }
}

fn strip_percent(text: &str) -> String {
    text.trim().trim_end_matches('%').trim().to_string()
}
