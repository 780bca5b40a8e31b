//! Market Gate - crypto market health scoring server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use config::Config;
use services::{MarketFeed, MarketGateService};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub feed: Arc<dyn MarketFeed>,
    pub market_gate: Arc<MarketGateService>,
}

// Re-export commonly used types
pub use error::{AppError, GateError};
pub use services::Cache;
pub use types::*;
