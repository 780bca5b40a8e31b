use crate::api::resolve_asset;
use crate::error::Result;
use crate::types::GateResult;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Query params for the market gate endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct GateQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    /// Recompute from fresh upstream data.
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/analysis/market-gate
async fn get_market_gate(
    State(state): State<AppState>,
    query: std::result::Result<Query<GateQuery>, QueryRejection>,
) -> Result<Json<GateResult>> {
    let Query(query) = query?;
    let asset = resolve_asset(query.symbol.as_deref())?;
    let result = state.market_gate.get_gate(&asset, query.refresh).await?;
    Ok(Json(result))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/market-gate", get(get_market_gate))
}
