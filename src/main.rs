// =============================================================================
// Tickr Backend — Main Entry Point
// =============================================================================
//
// Read-only market-data aggregator: crypto and stock lists, single-asset
// detail and synthetic history, each served from a TTL cache in front of
// CoinGecko and Alpha Vantage with mock fallbacks.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod cache;
mod config;
mod mock;
mod numeric;
mod providers;
mod resolver;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::AppConfig;

const DEFAULT_CONFIG_PATH: &str = "tickr_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Tickr backend starting up");

    let config_path =
        std::env::var("TICKR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    config.apply_env();
    info!(config = ?config, "Configuration resolved");

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::from_config(config)?);

    // ── 3. Cache compaction loop ─────────────────────────────────────────
    let purge_secs = state.config.cache_purge_interval_secs;
    if purge_secs > 0 {
        let cache = state.cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(purge_secs));
            // The first tick completes immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if cache.is_empty() {
                    continue;
                }
                let removed = cache.purge_expired();
                debug!(removed, remaining = cache.len(), "cache purge");
            }
        });
    }

    // ── 4. HTTP server ───────────────────────────────────────────────────
    let app = api::router(state.clone());
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP server listening");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!(uptime_secs = state.uptime().as_secs(), "Tickr backend shut down complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
