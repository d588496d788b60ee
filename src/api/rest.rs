// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/` and are read-only. Every market view is
// served through the resolver, so a handler never sees a provider error:
// the only failures are a blank symbol (400) and internal faults (500).
//
// CORS origins come from `AppConfig::cors_allowed_origins`; an empty list or
// `*` allows any origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{instrument, warn};

use crate::api::ApiResult;
use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::types::{AssetDetail, HistoryPoint, NormalizedAsset};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/health", get(health))
        // ── Lists ───────────────────────────────────────────────────
        .route("/api/crypto", get(crypto_prices))
        .route("/api/stocks/us", get(us_stocks))
        .route("/api/stocks/indo", get(indo_stocks))
        // ── Single asset ────────────────────────────────────────────
        .route("/api/asset/:symbol", get(asset_detail))
        .route("/api/asset/:symbol/history", get(asset_history))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if config.cors_allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

// =============================================================================
// Query parameters
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryParams {
    period: Option<String>,
}

/// `limit` query value. Missing, negative or non-numeric means unlimited (0).
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(0)
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health())
}

// =============================================================================
// Lists
// =============================================================================

#[instrument(skip(state))]
async fn crypto_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<NormalizedAsset>>> {
    let limit = parse_limit(params.limit.as_deref());
    Ok(Json(state.resolver.crypto_prices(limit).await?))
}

#[instrument(skip(state))]
async fn us_stocks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<NormalizedAsset>>> {
    let limit = parse_limit(params.limit.as_deref());
    Ok(Json(state.resolver.us_stocks(limit).await?))
}

#[instrument(skip(state))]
async fn indo_stocks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<NormalizedAsset>>> {
    let limit = parse_limit(params.limit.as_deref());
    Ok(Json(state.resolver.indo_stocks(limit).await?))
}

// =============================================================================
// Single asset
// =============================================================================

#[instrument(skip(state))]
async fn asset_detail(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<AssetDetail>> {
    Ok(Json(state.resolver.asset_detail(&symbol).await?))
}

#[instrument(skip(state))]
async fn asset_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<HistoryPoint>>> {
    let period = params.period.as_deref().unwrap_or("1D");
    Ok(Json(state.resolver.asset_history(&symbol, period).await?))
}
