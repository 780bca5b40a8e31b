//! Shared fixtures: a scriptable in-memory market feed.

#![allow(dead_code)]

use async_trait::async_trait;
use market_gate::services::{Cache, MarketFeed, MarketGateService};
use market_gate::sources::FetchError;
use market_gate::types::{
    BreadthSnapshot, FearGreedData, FundingSnapshot, GlobalMetrics, MarketHistory, SeriesPoint,
    TrackedAsset,
};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Closes growing `growth` per step, constant volume with a final spike.
pub fn rising_history(points: usize, growth: f64) -> MarketHistory {
    let prices = (0..points)
        .map(|i| SeriesPoint {
            time: i as i64 * 86_400_000,
            value: 100.0 * (1.0 + growth).powi(i as i32),
        })
        .collect();
    let volumes = (0..points)
        .map(|i| SeriesPoint {
            time: i as i64 * 86_400_000,
            value: if i + 1 == points { 5_000.0 } else { 1_000.0 },
        })
        .collect();
    MarketHistory { prices, volumes }
}

/// In-memory feed. `None` fields fail with an upstream error.
pub struct StubFeed {
    pub history: Option<MarketHistory>,
    pub breadth: Option<f64>,
    pub fear_greed: Option<u8>,
    pub funding: Option<f64>,
    /// Artificial latency applied to the history fetch.
    pub history_delay: Option<Duration>,
    /// Artificial latency applied to the fear & greed fetch.
    pub fear_greed_delay: Option<Duration>,
    pub history_calls: AtomicUsize,
    pub invalidations: AtomicUsize,
}

impl StubFeed {
    pub fn healthy() -> Self {
        Self {
            history: Some(rising_history(300, 0.002)),
            breadth: Some(0.7),
            fear_greed: Some(64),
            funding: Some(0.0001),
            history_delay: None,
            fear_greed_delay: None,
            history_calls: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

fn unavailable(what: &str) -> FetchError {
    FetchError::Invalid(format!("{} unavailable in stub", what))
}

#[async_trait]
impl MarketFeed for StubFeed {
    async fn history(&self, _asset: &TrackedAsset) -> Result<MarketHistory, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.history_delay {
            tokio::time::sleep(delay).await;
        }
        self.history.clone().ok_or_else(|| unavailable("history"))
    }

    async fn alt_breadth(&self) -> Result<BreadthSnapshot, FetchError> {
        let ratio = self.breadth.ok_or_else(|| unavailable("breadth"))?;
        Ok(BreadthSnapshot {
            sampled: 50,
            advancing: (ratio * 50.0).round() as usize,
            ratio,
        })
    }

    async fn fear_greed(&self) -> Result<FearGreedData, FetchError> {
        if let Some(delay) = self.fear_greed_delay {
            tokio::time::sleep(delay).await;
        }
        let value = self.fear_greed.ok_or_else(|| unavailable("fear & greed"))?;
        Ok(FearGreedData {
            value,
            classification: FearGreedData::classify(value).to_string(),
            timestamp: "1700000000".to_string(),
        })
    }

    async fn funding_rate(&self, asset: &TrackedAsset) -> Result<FundingSnapshot, FetchError> {
        let rate = self.funding.ok_or_else(|| unavailable("funding"))?;
        Ok(FundingSnapshot {
            symbol: asset.perp_pair.to_string(),
            rate,
            mark_price: None,
            next_funding_time: None,
        })
    }

    async fn global_metrics(&self) -> Result<GlobalMetrics, FetchError> {
        Ok(GlobalMetrics {
            total_market_cap: 2.5e12,
            total_volume_24h: 9.0e10,
            btc_dominance: 52.0,
            eth_dominance: 17.0,
            active_cryptocurrencies: 12_000,
            market_cap_change_24h: 1.5,
            last_updated: "2024-01-01T00:00:00+00:00".to_string(),
        })
    }

    fn invalidate(&self, _asset: &TrackedAsset) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Feed whose fear & greed reading sits behind a TTL cache, the way the
/// live clients cache their upstream responses.
pub struct CachingFeed {
    pub inner: StubFeed,
    pub upstream_fear_greed: AtomicU8,
    fear_greed_cache: Cache<FearGreedData>,
}

impl CachingFeed {
    pub fn new(fear_greed: u8) -> Self {
        Self {
            inner: StubFeed::healthy(),
            upstream_fear_greed: AtomicU8::new(fear_greed),
            fear_greed_cache: Cache::new(Duration::from_secs(3600)),
        }
    }

    /// Change what the upstream reports from now on.
    pub fn publish(&self, fear_greed: u8) {
        self.upstream_fear_greed.store(fear_greed, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketFeed for CachingFeed {
    async fn history(&self, asset: &TrackedAsset) -> Result<MarketHistory, FetchError> {
        self.inner.history(asset).await
    }

    async fn alt_breadth(&self) -> Result<BreadthSnapshot, FetchError> {
        self.inner.alt_breadth().await
    }

    async fn fear_greed(&self) -> Result<FearGreedData, FetchError> {
        self.fear_greed_cache
            .get_or_try_insert_with("fear_greed", || async move {
                let value = self.upstream_fear_greed.load(Ordering::SeqCst);
                Ok(FearGreedData {
                    value,
                    classification: FearGreedData::classify(value).to_string(),
                    timestamp: "1700000000".to_string(),
                })
            })
            .await
    }

    async fn funding_rate(&self, asset: &TrackedAsset) -> Result<FundingSnapshot, FetchError> {
        self.inner.funding_rate(asset).await
    }

    async fn global_metrics(&self) -> Result<GlobalMetrics, FetchError> {
        self.inner.global_metrics().await
    }

    fn invalidate(&self, asset: &TrackedAsset) {
        self.fear_greed_cache.remove("fear_greed");
        self.inner.invalidate(asset);
    }
}

/// Gate service over a test feed with a short fetch timeout.
pub fn gate_service<F: MarketFeed + 'static>(feed: Arc<F>) -> Arc<MarketGateService> {
    MarketGateService::new(
        feed,
        Arc::new(Cache::new(Duration::from_secs(60))),
        Duration::from_millis(200),
    )
}
