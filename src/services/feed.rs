//! The seam between the scoring service and the upstream APIs.

use crate::sources::{AlternativeMeClient, BinanceFuturesClient, CoinGeckoClient, FetchError};
use crate::types::{
    BreadthSnapshot, FearGreedData, FundingSnapshot, GlobalMetrics, MarketHistory, TrackedAsset,
};
use async_trait::async_trait;

/// Source of every market input the service needs.
///
/// Each method fails independently; callers decide how to recover.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Daily close/volume history, oldest first.
    async fn history(&self, asset: &TrackedAsset) -> Result<MarketHistory, FetchError>;

    /// Altcoin breadth snapshot.
    async fn alt_breadth(&self) -> Result<BreadthSnapshot, FetchError>;

    /// Current Fear & Greed reading.
    async fn fear_greed(&self) -> Result<FearGreedData, FetchError>;

    /// Latest perpetual funding rate for the asset.
    async fn funding_rate(&self, asset: &TrackedAsset) -> Result<FundingSnapshot, FetchError>;

    /// Global market metrics.
    async fn global_metrics(&self) -> Result<GlobalMetrics, FetchError>;

    /// Drop any cached inputs used to score `asset`, so the next reads go
    /// upstream.
    fn invalidate(&self, asset: &TrackedAsset);
}

/// Feed backed by the public CoinGecko, Binance and alternative.me APIs.
pub struct LiveFeed {
    coingecko: CoinGeckoClient,
    binance: BinanceFuturesClient,
    alternative_me: AlternativeMeClient,
}

impl LiveFeed {
    pub fn new(
        coingecko: CoinGeckoClient,
        binance: BinanceFuturesClient,
        alternative_me: AlternativeMeClient,
    ) -> Self {
        Self {
            coingecko,
            binance,
            alternative_me,
        }
    }
}

#[async_trait]
impl MarketFeed for LiveFeed {
    async fn history(&self, asset: &TrackedAsset) -> Result<MarketHistory, FetchError> {
        self.coingecko.get_history(asset).await
    }

    async fn alt_breadth(&self) -> Result<BreadthSnapshot, FetchError> {
        self.coingecko.get_alt_breadth().await
    }

    async fn fear_greed(&self) -> Result<FearGreedData, FetchError> {
        self.alternative_me.get_fear_greed().await
    }

    async fn funding_rate(&self, asset: &TrackedAsset) -> Result<FundingSnapshot, FetchError> {
        self.binance.get_funding_rate(asset).await
    }

    async fn global_metrics(&self) -> Result<GlobalMetrics, FetchError> {
        self.coingecko.get_global_metrics().await
    }

    fn invalidate(&self, asset: &TrackedAsset) {
        self.coingecko.invalidate(asset);
        self.binance.invalidate(asset);
        self.alternative_me.invalidate();
    }
}
