// =============================================================================
// Alpha Vantage REST client — GLOBAL_QUOTE and TOP_GAINERS_LOSERS
// =============================================================================
//
// SECURITY: the API key travels in the query string (Alpha Vantage offers no
// header auth) so request URLs are never logged verbatim.
//
// Alpha Vantage reports throttling in-band with HTTP 200 and a "Note" or
// "Information" field instead of data; both are mapped to `RateLimited`.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::error::ProviderError;
use super::models::{GlobalQuote, StockListingRow};
use super::rate_limit::{BudgetSnapshot, RequestBudget};
use super::{QuoteProvider, StockListProvider};
use crate::types::UsListing;

const PROVIDER_ID: &str = "ALPHA_VANTAGE";
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopMoversResponse {
    #[serde(default)]
    top_gainers: Vec<StockListingRow>,
    #[serde(default)]
    most_actively_traded: Vec<StockListingRow>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Alpha Vantage client shared by the quote and stock-list tiers.
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    budget: RequestBudget,
}

impl AlphaVantageClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        calls_per_minute: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Alpha Vantage HTTP client")?;

        let api_key = api_key.into();
        if api_key.is_empty() {
            warn!("ALPHAVANTAGE_API_KEY is empty — stock tiers will fall back to mock data");
        }

        Ok(Self {
            api_key,
            base_url: base_url.into(),
            client,
            budget: RequestBudget::new(calls_per_minute),
        })
    }

    /// Issue one budgeted GET and return the raw body text.
    async fn get_text(&self, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        if !self.budget.try_acquire() {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER_ID,
            });
        }

        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e.without_url()))?;

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

        resp.text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_ID, e.without_url()))
    }

    pub fn budget_snapshot(&self) -> BudgetSnapshot {
        self.budget.snapshot()
    }
}

/// Map Alpha Vantage's in-band error fields to a provider error.
fn check_api_error(
    error_message: &Option<String>,
    note: &Option<String>,
    information: &Option<String>,
) -> Result<(), ProviderError> {
    if let Some(msg) = error_message {
        return Err(ProviderError::Decode {
            provider: PROVIDER_ID,
            message: msg.clone(),
        });
    }
    // Any Note/Information without data is throttling or a key problem.
    if let Some(msg) = note.as_ref().or(information.as_ref()) {
        warn!(message = %msg, "Alpha Vantage returned an in-band notice");
        return Err(ProviderError::RateLimited {
            provider: PROVIDER_ID,
        });
    }
    Ok(())
}

fn parse_global_quote(symbol: &str, body: &str) -> Result<GlobalQuote, ProviderError> {
    let parsed: GlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::decode(PROVIDER_ID, e))?;

    match parsed.global_quote {
        Some(quote) if !quote.is_empty() => Ok(quote),
        Some(_) => Err(ProviderError::NotFound {
            provider: PROVIDER_ID,
            symbol: symbol.to_string(),
        }),
        None => {
            check_api_error(&parsed.error_message, &parsed.note, &parsed.information)?;
            Err(ProviderError::NotFound {
                provider: PROVIDER_ID,
                symbol: symbol.to_string(),
            })
        }
    }
}

fn parse_top_movers(listing: UsListing, body: &str) -> Result<Vec<StockListingRow>, ProviderError> {
    let parsed: TopMoversResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::decode(PROVIDER_ID, e))?;

    let rows = match listing {
        UsListing::MostActive => parsed.most_actively_traded,
        UsListing::TopGainers => parsed.top_gainers,
    };
    if rows.is_empty() {
        check_api_error(&parsed.error_message, &parsed.note, &parsed.information)?;
        return Err(ProviderError::EmptyPayload {
            provider: PROVIDER_ID,
        });
    }
    Ok(rows)
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    #[instrument(skip(self), name = "alpha_vantage::global_quote")]
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote, ProviderError> {
        let body = self
            .get_text(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        let quote = parse_global_quote(symbol, &body)?;
        debug!(symbol, price = %quote.price, "global quote fetched");
        Ok(quote)
    }
}

#[async_trait]
impl StockListProvider for AlphaVantageClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    #[instrument(skip(self), name = "alpha_vantage::ranked_listing")]
    async fn ranked_listing(
        &self,
        listing: UsListing,
    ) -> Result<Vec<StockListingRow>, ProviderError> {
        let body = self
            .get_text(&[("function", "TOP_GAINERS_LOSERS")])
            .await?;
        let rows = parse_top_movers(listing, &body)?;
        debug!(%listing, count = rows.len(), "ranked listing fetched");
        Ok(rows)
    }

    fn budget(&self) -> Option<BudgetSnapshot> {
        Some(self.budget_snapshot())
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("budget", &self.budget)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_populated_quote() {
        let body = r#"{"Global Quote": {"01. symbol": "BBCA.JK", "05. price": "10250.0000",
            "06. volume": "81234500", "10. change percent": "1.2300%"}}"#;
        let quote = parse_global_quote("BBCA.JK", body).unwrap();
        assert_eq!(quote.volume_f64(), 81_234_500.0);
        assert_eq!(quote.change_f64(), 1.23);
    }

    #[test]
    fn empty_quote_object_is_not_found() {
        let err = parse_global_quote("ZZZZ", r#"{"Global Quote": {}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[test]
    fn throttle_note_is_rate_limited() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_global_quote("IBM", body).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));

        let body = r#"{"Information": "We have detected your API key as demo"}"#;
        let err = parse_top_movers(UsListing::MostActive, body).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[test]
    fn error_message_is_decode_error() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        let err = parse_global_quote("???", body).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn top_movers_selects_requested_list() {
        let body = r#"{
            "metadata": "Top gainers, losers, and most actively traded US tickers",
            "top_gainers": [{"ticker": "ABCD", "price": "1.20", "change_percentage": "80.5%", "volume": "100"}],
            "top_losers": [],
            "most_actively_traded": [
                {"ticker": "TSLA", "price": "240.12", "change_percentage": "-2.34%", "volume": "900"},
                {"ticker": "NVDA", "price": "134.50", "change_percentage": "4.56%", "volume": "800"}
            ]
        }"#;
        let active = parse_top_movers(UsListing::MostActive, body).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].ticker, "TSLA");

        let gainers = parse_top_movers(UsListing::TopGainers, body).unwrap();
        assert_eq!(gainers.len(), 1);
        assert_eq!(gainers[0].ticker, "ABCD");
    }

    #[test]
    fn empty_list_is_empty_payload() {
        let err = parse_top_movers(UsListing::TopGainers, r#"{"top_gainers": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyPayload { .. }));
    }

    #[tokio::test]
    async fn spent_budget_fails_without_network() {
        let client = AlphaVantageClient::new(
            "demo",
            "http://127.0.0.1:9/query",
            Duration::from_secs(1),
            1,
        )
        .unwrap();
        // First call consumes the only slot (and fails on the closed port).
        let _ = client.global_quote("IBM").await;
        let err = client.global_quote("IBM").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }
}
