use crate::api::resolve_asset;
use crate::error::Result;
use crate::types::{BreadthSnapshot, FearGreedData, FundingSnapshot, GlobalMetrics};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unix timestamp (seconds) of the response.
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            meta: ApiMeta {
                timestamp: chrono::Utc::now().timestamp(),
            },
        }
    }
}

/// Query params for per-asset endpoints.
#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// GET /api/market/fear-greed
async fn get_fear_greed(State(state): State<AppState>) -> Result<Json<ApiResponse<FearGreedData>>> {
    let data = state.feed.fear_greed().await?;
    Ok(Json(ApiResponse::new(data)))
}

/// GET /api/market/funding
async fn get_funding(
    State(state): State<AppState>,
    query: std::result::Result<Query<SymbolQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<FundingSnapshot>>> {
    let Query(query) = query?;
    let asset = resolve_asset(query.symbol.as_deref())?;
    let data = state.feed.funding_rate(&asset).await?;
    Ok(Json(ApiResponse::new(data)))
}

/// GET /api/market/breadth
async fn get_breadth(State(state): State<AppState>) -> Result<Json<ApiResponse<BreadthSnapshot>>> {
    let data = state.feed.alt_breadth().await?;
    Ok(Json(ApiResponse::new(data)))
}

/// GET /api/market/global
async fn get_global(State(state): State<AppState>) -> Result<Json<ApiResponse<GlobalMetrics>>> {
    let data = state.feed.global_metrics().await?;
    Ok(Json(ApiResponse::new(data)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fear-greed", get(get_fear_greed))
        .route("/funding", get(get_funding))
        .route("/breadth", get(get_breadth))
        .route("/global", get(get_global))
}
