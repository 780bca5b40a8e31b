use crate::services::Cache;
use crate::sources::{read_body, FetchError};
use crate::types::{FundingSnapshot, TrackedAsset};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const BINANCE_FUTURES_API_URL: &str = "https://fapi.binance.com/fapi/v1";

/// Binance `premiumIndex` response. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    symbol: String,
    mark_price: Option<String>,
    last_funding_rate: String,
    next_funding_time: Option<i64>,
}

/// Binance USDT-margined futures client (public endpoints only).
#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    funding_cache: Arc<Cache<FundingSnapshot>>,
}

impl BinanceFuturesClient {
    /// Create a new Binance futures client.
    pub fn new(client: Client, funding_cache: Arc<Cache<FundingSnapshot>>) -> Self {
        Self {
            client,
            funding_cache,
        }
    }

    /// Forget the cached funding rate for the asset's perpetual.
    pub fn invalidate(&self, asset: &TrackedAsset) {
        self.funding_cache.remove(asset.perp_pair);
    }

    /// Latest funding rate for the asset's perpetual.
    pub async fn get_funding_rate(
        &self,
        asset: &TrackedAsset,
    ) -> Result<FundingSnapshot, FetchError> {
        let pair = asset.perp_pair;
        self.funding_cache
            .get_or_try_insert_with(pair, || async move {
                let url = format!("{}/premiumIndex?symbol={}", BINANCE_FUTURES_API_URL, pair);
                let response = self.client.get(&url).send().await?;
                let body = read_body("Binance", response).await?;
                let snapshot = parse_premium_index(&body)?;
                debug!("Binance funding {} = {}", snapshot.symbol, snapshot.rate);
                Ok(snapshot)
            })
            .await
    }
}

/// Parse a `premiumIndex` payload.
pub fn parse_premium_index(body: &str) -> Result<FundingSnapshot, FetchError> {
    let index: PremiumIndex = serde_json::from_str(body)?;

    let rate: f64 = index.last_funding_rate.trim().parse().map_err(|_| {
        FetchError::Invalid(format!(
            "funding rate {:?} is not a number",
            index.last_funding_rate
        ))
    })?;
    if !rate.is_finite() {
        return Err(FetchError::Invalid("funding rate is not finite".to_string()));
    }

    Ok(FundingSnapshot {
        symbol: index.symbol,
        rate,
        mark_price: index.mark_price.and_then(|p| p.parse().ok()),
        next_funding_time: index.next_funding_time,
    })
}
