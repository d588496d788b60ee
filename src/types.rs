// =============================================================================
// Shared types used across the Tickr market-data backend
// =============================================================================
//
// Everything a provider returns is coerced into one of these records at the
// provider boundary. The resolver, the cache and the HTTP layer only ever see
// these shapes.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Canonical list entry for a crypto coin or a stock.
///
/// `high`, `low` and `volume` are optional: mock datasets and ranked stock
/// listings do not carry them, and absent values are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAsset {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change_percent_24h: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
}

/// Single-asset view returned by `/api/asset/:symbol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change_percent_24h: String,
    pub high: String,
    pub low: String,
    pub volume: String,
    pub prev_close: String,
}

/// One point of a synthetic price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub label: String,
    pub price: f64,
}

/// Numeric field a list endpoint ranks by (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriterion {
    Volume,
    Change24h,
}

impl Default for RankingCriterion {
    fn default() -> Self {
        Self::Volume
    }
}

impl std::fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Change24h => write!(f, "change_24h"),
        }
    }
}

impl std::str::FromStr for RankingCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "volume" => Ok(Self::Volume),
            "change" | "change_24h" | "change24h" => Ok(Self::Change24h),
            other => Err(format!("unknown ranking criterion '{other}'")),
        }
    }
}

/// Which ranked list the US stock endpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsListing {
    MostActive,
    TopGainers,
}

impl Default for UsListing {
    fn default() -> Self {
        Self::MostActive
    }
}

impl std::fmt::Display for UsListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MostActive => write!(f, "most_active"),
            Self::TopGainers => write!(f, "top_gainers"),
        }
    }
}

impl std::str::FromStr for UsListing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most_active" | "most-active" | "active" => Ok(Self::MostActive),
            "top_gainers" | "top-gainers" | "gainers" => Ok(Self::TopGainers),
            other => Err(format!("unknown US listing '{other}'")),
        }
    }
}

/// Mock dataset selector for the stock endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Us,
    Indo,
}

/// Chart window requested for `/api/asset/:symbol/history`.
///
/// Unknown period codes parse as [`HistoryPeriod::OneDay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
    All,
}

impl HistoryPeriod {
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "1W" => Self::OneWeek,
            "1M" => Self::OneMonth,
            "1Y" => Self::OneYear,
            "ALL" => Self::All,
            _ => Self::OneDay,
        }
    }

    /// Number of points and volatility fraction of the generated walk.
    pub fn shape(self) -> (usize, f64) {
        match self {
            Self::OneDay => (24, 0.02),
            Self::OneWeek => (28, 0.05),
            Self::OneMonth => (30, 0.08),
            Self::OneYear => (52, 0.20),
            Self::All => (100, 0.40),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::OneYear => "1Y",
            Self::All => "ALL",
        }
    }
}

impl std::fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
