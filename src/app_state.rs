// =============================================================================
// Central Application State — Tickr Backend
// =============================================================================
//
// Built once in `main` and shared with every handler as `Arc<AppState>`.
// There are no global singletons: the cache, the provider clients and the
// resolver all hang off this struct.
//
// Thread safety:
//   - The cache guards itself with a parking_lot::RwLock.
//   - Provider clients are immutable apart from the atomic request budget.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::cache::{CachedView, TtlCache};
use crate::config::AppConfig;
use crate::providers::{AlphaVantageClient, BudgetSnapshot, CoinGeckoClient};
use crate::resolver::{Resolver, ResolverPolicy};

// =============================================================================
// Health snapshot
// =============================================================================

/// Liveness payload for `/api/health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub cache_entries: usize,
    pub uptime_secs: u64,
    pub alpha_vantage_budget: Option<BudgetSnapshot>,
    /// Milliseconds since the Unix epoch.
    pub server_time: i64,
}

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    pub config: AppConfig,
    pub cache: Arc<TtlCache<CachedView>>,
    pub resolver: Resolver,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, cache: Arc<TtlCache<CachedView>>, resolver: Resolver) -> Self {
        Self {
            config,
            cache,
            resolver,
            started_at: Instant::now(),
        }
    }

    /// Wire the live provider clients and the resolver from `config`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.provider_timeout_secs);

        let coingecko = Arc::new(CoinGeckoClient::new(&config.coingecko_base_url, timeout)?);
        // One client serves both stock roles so they share a single budget.
        let alpha_vantage = Arc::new(AlphaVantageClient::new(
            &config.alpha_vantage_api_key,
            &config.alpha_vantage_base_url,
            timeout,
            config.alpha_vantage_calls_per_minute,
        )?);

        let cache = Arc::new(TtlCache::new());
        let policy = ResolverPolicy::from_config(&config);
        info!(
            crypto_ranking = %policy.crypto_ranking,
            us_listing = %policy.us_listing,
            indo_ranking = %policy.indo_ranking,
            indo_symbols = policy.indo_symbols.len(),
            "resolver policy"
        );

        let resolver = Resolver::new(
            cache.clone(),
            coingecko,
            alpha_vantage.clone(),
            alpha_vantage,
            policy,
        );

        Ok(Self::new(config, cache, resolver))
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            cache_entries: self.cache.len(),
            uptime_secs: self.uptime().as_secs(),
            alpha_vantage_budget: self.resolver.stock_budget(),
            server_time: Utc::now().timestamp_millis(),
        }
    }
}
