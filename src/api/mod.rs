pub mod analysis;
pub mod health;
pub mod market;

use crate::error::{AppError, Result};
use crate::types::TrackedAsset;
use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/analysis", analysis::router())
        .nest("/api/market", market::router())
}

/// Resolve an optional `?symbol=` parameter to a tracked asset.
pub(crate) fn resolve_asset(symbol: Option<&str>) -> Result<TrackedAsset> {
    match symbol {
        None => Ok(TrackedAsset::default_asset()),
        Some(s) if s.trim().is_empty() => Ok(TrackedAsset::default_asset()),
        Some(s) => TrackedAsset::find(s)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported symbol: {}", s))),
    }
}
