// =============================================================================
// Application Configuration — JSON file defaults overridden by environment
// =============================================================================
//
// Every tunable lives here. The optional JSON file carries deployment policy
// (ranking criteria, TTLs, regional symbol list); the environment carries
// credentials and per-host settings and always wins.
//
// All fields carry `#[serde(default)]` so that a partial or older file still
// loads.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::providers::{alpha_vantage, coingecko};
use crate::resolver::DEFAULT_INDO_SYMBOLS;
use crate::types::{RankingCriterion, UsListing};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_port() -> u16 {
    8080
}

fn default_coingecko_base_url() -> String {
    coingecko::DEFAULT_BASE_URL.to_string()
}

fn default_alpha_vantage_base_url() -> String {
    alpha_vantage::DEFAULT_BASE_URL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_indo_symbols() -> Vec<String> {
    DEFAULT_INDO_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

fn default_indo_max_results() -> usize {
    10
}

fn default_alpha_vantage_calls_per_minute() -> u32 {
    5
}

fn default_list_ttl_secs() -> u64 {
    5 * 60
}

fn default_live_ttl_secs() -> u64 {
    60
}

fn default_cache_purge_interval_secs() -> u64 {
    5 * 60
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // --- Server -------------------------------------------------------------

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty or `*` allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    // --- Providers ----------------------------------------------------------

    /// Alpha Vantage credential. Never serialised back out.
    #[serde(default, skip_serializing)]
    pub alpha_vantage_api_key: String,

    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    #[serde(default = "default_alpha_vantage_base_url")]
    pub alpha_vantage_base_url: String,

    /// Uniform timeout applied to every upstream call.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Local per-minute call budget for Alpha Vantage (0 = unlimited).
    #[serde(default = "default_alpha_vantage_calls_per_minute")]
    pub alpha_vantage_calls_per_minute: u32,

    // --- Ranking policy -----------------------------------------------------

    #[serde(default)]
    pub crypto_ranking: RankingCriterion,

    #[serde(default)]
    pub us_listing: UsListing,

    #[serde(default)]
    pub indo_ranking: RankingCriterion,

    #[serde(default = "default_indo_symbols")]
    pub indo_symbols: Vec<String>,

    #[serde(default = "default_indo_max_results")]
    pub indo_max_results: usize,

    // --- Cache --------------------------------------------------------------

    #[serde(default = "default_list_ttl_secs")]
    pub list_ttl_secs: u64,

    #[serde(default = "default_live_ttl_secs")]
    pub live_ttl_secs: u64,

    /// Interval of the background expired-entry purge (0 = never).
    #[serde(default = "default_cache_purge_interval_secs")]
    pub cache_purge_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_allowed_origins: Vec::new(),
            alpha_vantage_api_key: String::new(),
            coingecko_base_url: default_coingecko_base_url(),
            alpha_vantage_base_url: default_alpha_vantage_base_url(),
            provider_timeout_secs: default_provider_timeout_secs(),
            alpha_vantage_calls_per_minute: default_alpha_vantage_calls_per_minute(),
            crypto_ranking: RankingCriterion::default(),
            us_listing: UsListing::default(),
            indo_ranking: RankingCriterion::default(),
            indo_symbols: default_indo_symbols(),
            indo_max_results: default_indo_max_results(),
            list_ttl_secs: default_list_ttl_secs(),
            live_ttl_secs: default_live_ttl_secs(),
            cache_purge_interval_secs: default_cache_purge_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are ignored with a
    /// warning so a typo never takes the service down.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            match port.trim().parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!(value = %port, "ignoring invalid PORT"),
            }
        }
        if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
            self.cors_allowed_origins = split_list(&origins);
        }
        if let Some(key) = var("ALPHAVANTAGE_API_KEY") {
            self.alpha_vantage_api_key = key.trim().to_string();
        }
        if let Some(secs) = var("PROVIDER_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(s) => self.provider_timeout_secs = s,
                Err(_) => warn!(value = %secs, "ignoring invalid PROVIDER_TIMEOUT_SECS"),
            }
        }
        if let Some(value) = var("CRYPTO_RANKING") {
            match value.parse() {
                Ok(c) => self.crypto_ranking = c,
                Err(e) => warn!(error = %e, "ignoring CRYPTO_RANKING"),
            }
        }
        if let Some(value) = var("INDO_RANKING") {
            match value.parse() {
                Ok(c) => self.indo_ranking = c,
                Err(e) => warn!(error = %e, "ignoring INDO_RANKING"),
            }
        }
        if let Some(value) = var("US_LISTING") {
            match value.parse() {
                Ok(l) => self.us_listing = l,
                Err(e) => warn!(error = %e, "ignoring US_LISTING"),
            }
        }
        if let Some(symbols) = var("INDO_SYMBOLS") {
            let symbols: Vec<String> = split_list(&symbols)
                .into_iter()
                .map(|s| s.to_uppercase())
                .collect();
            if !symbols.is_empty() {
                self.indo_symbols = symbols;
            }
        }
    }

    /// `true` when CORS should allow any origin.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("alpha_vantage_api_key", &"<redacted>")
            .field("coingecko_base_url", &self.coingecko_base_url)
            .field("alpha_vantage_base_url", &self.alpha_vantage_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field(
                "alpha_vantage_calls_per_minute",
                &self.alpha_vantage_calls_per_minute,
            )
            .field("crypto_ranking", &self.crypto_ranking)
            .field("us_listing", &self.us_listing)
            .field("indo_ranking", &self.indo_ranking)
            .field("indo_symbols", &self.indo_symbols)
            .field("indo_max_results", &self.indo_max_results)
            .field("list_ttl_secs", &self.list_ttl_secs)
            .field("live_ttl_secs", &self.live_ttl_secs)
            .field("cache_purge_interval_secs", &self.cache_purge_interval_secs)
            .finish()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
