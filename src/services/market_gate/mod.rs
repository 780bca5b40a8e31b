//! Market Gate: a 0-100 market health score with a GREEN/YELLOW/RED gate.
//!
//! Pipeline: concurrent fetches → technical transforms → category rubrics
//! → composite aggregation. Everything after the fetches is pure.

pub mod aggregator;
pub mod scorers;
pub mod transforms;

pub use aggregator::{compute_gate, evaluate, GateIndicators, GateInputs, MIN_PRICE_POINTS};

use crate::error::Result;
use crate::services::{Cache, MarketFeed};
use crate::sources::FetchError;
use crate::types::{GateResult, TrackedAsset};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Computes and caches gate results per asset.
pub struct MarketGateService {
    feed: Arc<dyn MarketFeed>,
    cache: Arc<Cache<GateResult>>,
    fetch_timeout: Duration,
}

impl MarketGateService {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        cache: Arc<Cache<GateResult>>,
        fetch_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            feed,
            cache,
            fetch_timeout,
        })
    }

    /// The response cache, shared with the background sweeper.
    pub fn cache(&self) -> Arc<Cache<GateResult>> {
        self.cache.clone()
    }

    /// Gate result for an asset, served from cache while fresh.
    ///
    /// `refresh` skips the result cache and drops the feed's cached inputs.
    pub async fn get_gate(&self, asset: &TrackedAsset, refresh: bool) -> Result<GateResult> {
        let cache_key = format!("gate:{}", asset.symbol);

        if refresh {
            debug!("Refreshing market gate inputs for {}", asset.symbol);
            self.feed.invalidate(asset);
        } else if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Serving cached market gate for {}", asset.symbol);
            return Ok(cached);
        }

        let result = self.compute(asset).await?;
        self.cache.set(cache_key, result.clone());
        Ok(result)
    }

    /// Fetch all inputs concurrently and score them.
    ///
    /// Only a failed or too-short price history is an error; secondary
    /// indicators fall back to defaults.
    pub async fn compute(&self, asset: &TrackedAsset) -> Result<GateResult> {
        let (history, breadth, fear_greed, funding) = tokio::join!(
            self.bounded("price history", self.feed.history(asset)),
            self.bounded("altcoin breadth", self.feed.alt_breadth()),
            self.bounded("fear & greed", self.feed.fear_greed()),
            self.bounded("funding rate", self.feed.funding_rate(asset)),
        );

        let history = history?;
        let inputs = GateInputs::resolve(
            &history,
            breadth.map(|b| b.ratio),
            fear_greed.map(|f| f.value),
            funding.map(|f| f.rate),
        );

        let result = compute_gate(&inputs, chrono::Utc::now())?;
        info!(
            "Market gate for {}: {} ({})",
            asset.symbol, result.score, result.gate_color
        );
        Ok(result)
    }

    async fn bounded<T>(
        &self,
        what: &'static str,
        fetch: impl Future<Output = std::result::Result<T, FetchError>>,
    ) -> std::result::Result<T, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(what)),
        }
    }
}
