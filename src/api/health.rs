use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Gate results currently held in the response cache.
    cached_gates: usize,
    gate_ttl_secs: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cached_gates: state.market_gate.cache().len(),
        gate_ttl_secs: state.config.cache.gate_ttl_secs,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
