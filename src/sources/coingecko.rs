use crate::services::Cache;
use crate::sources::{read_body, FetchError};
use crate::types::{BreadthSnapshot, GlobalMetrics, MarketHistory, SeriesPoint, TrackedAsset};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const COINGECKO_PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";

/// Coin excluded from the altcoin breadth sample.
const BREADTH_EXCLUDED_ID: &str = "bitcoin";

/// CoinGecko market chart response.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarketChart {
    prices: Vec<[f64; 2]>,
    total_volumes: Vec<[f64; 2]>,
}

/// One row of `/coins/markets`.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoGlobalResponse {
    data: CoinGeckoGlobalData,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoGlobalData {
    #[serde(default)]
    active_cryptocurrencies: i64,
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
    market_cap_change_percentage_24h_usd: Option<f64>,
    updated_at: Option<i64>,
}

/// CoinGecko REST client for history, breadth and global metrics.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
    history_days: u32,
    breadth_sample: usize,
    history_cache: Arc<Cache<MarketHistory>>,
    breadth_cache: Arc<Cache<BreadthSnapshot>>,
    global_cache: Arc<Cache<GlobalMetrics>>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko client.
    pub fn new(
        client: Client,
        api_key: Option<String>,
        history_days: u32,
        breadth_sample: usize,
        history_cache: Arc<Cache<MarketHistory>>,
        breadth_cache: Arc<Cache<BreadthSnapshot>>,
        global_cache: Arc<Cache<GlobalMetrics>>,
    ) -> Self {
        Self {
            client,
            api_key,
            history_days,
            breadth_sample,
            history_cache,
            breadth_cache,
            global_cache,
        }
    }

    fn base_url(&self) -> &str {
        if self.api_key.is_some() {
            COINGECKO_PRO_API_URL
        } else {
            COINGECKO_API_URL
        }
    }

    async fn get(&self, path_and_query: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url(), path_and_query);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request.send().await?;
        read_body("CoinGecko", response).await
    }

    fn history_key(&self, asset: &TrackedAsset) -> String {
        format!("history:{}:{}", asset.coingecko_id, self.history_days)
    }

    fn breadth_key(&self) -> String {
        format!("breadth:{}", self.breadth_sample)
    }

    /// Forget the cached history for `asset` and the breadth snapshot.
    pub fn invalidate(&self, asset: &TrackedAsset) {
        self.history_cache.remove(&self.history_key(asset));
        self.breadth_cache.remove(&self.breadth_key());
    }

    /// Daily close and volume history for an asset.
    pub async fn get_history(&self, asset: &TrackedAsset) -> Result<MarketHistory, FetchError> {
        let key = self.history_key(asset);
        self.history_cache
            .get_or_try_insert_with(&key, || async move {
                let path = format!(
                    "/coins/{}/market_chart?vs_currency=usd&days={}&interval=daily",
                    asset.coingecko_id, self.history_days
                );
                let body = self.get(&path).await?;
                let history = parse_market_chart(&body)?;
                info!(
                    "Fetched {} price points for {} from CoinGecko",
                    history.prices.len(),
                    asset.symbol
                );
                Ok(history)
            })
            .await
    }

    /// Share of the top altcoins by market cap with a positive 24h change.
    pub async fn get_alt_breadth(&self) -> Result<BreadthSnapshot, FetchError> {
        let key = self.breadth_key();
        self.breadth_cache
            .get_or_try_insert_with(&key, || async move {
                // One extra row so the sample is still full after dropping BTC.
                let path = format!(
                    "/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&price_change_percentage=24h",
                    self.breadth_sample + 1
                );
                let body = self.get(&path).await?;
                let snapshot = parse_alt_breadth(&body, self.breadth_sample)?;
                debug!(
                    "Altcoin breadth: {}/{} advancing",
                    snapshot.advancing, snapshot.sampled
                );
                Ok(snapshot)
            })
            .await
    }

    /// Global market metrics.
    pub async fn get_global_metrics(&self) -> Result<GlobalMetrics, FetchError> {
        self.global_cache
            .get_or_try_insert_with("global", || async move {
                let body = self.get("/global").await?;
                parse_global(&body)
            })
            .await
    }
}

/// Parse a `/market_chart` payload into an ascending history.
pub fn parse_market_chart(body: &str) -> Result<MarketHistory, FetchError> {
    let chart: CoinGeckoMarketChart = serde_json::from_str(body)?;

    let to_points = |rows: Vec<[f64; 2]>| -> Vec<SeriesPoint> {
        let mut points: Vec<SeriesPoint> = rows
            .into_iter()
            .filter(|[_, v]| v.is_finite())
            .map(|[t, v]| SeriesPoint {
                time: t as i64,
                value: v,
            })
            .collect();
        points.sort_by_key(|p| p.time);
        points
    };

    let prices = to_points(chart.prices);
    if prices.is_empty() {
        return Err(FetchError::Invalid("market chart has no prices".to_string()));
    }

    Ok(MarketHistory {
        prices,
        volumes: to_points(chart.total_volumes),
    })
}

/// Parse a `/coins/markets` payload into a breadth snapshot.
///
/// Bitcoin is dropped and the next `sample_size` coins are sampled; coins
/// without a reported 24h change are skipped.
pub fn parse_alt_breadth(body: &str, sample_size: usize) -> Result<BreadthSnapshot, FetchError> {
    let markets: Vec<CoinGeckoMarket> = serde_json::from_str(body)?;

    let changes: Vec<f64> = markets
        .into_iter()
        .filter(|m| m.id != BREADTH_EXCLUDED_ID)
        .take(sample_size)
        .filter_map(|m| m.price_change_percentage_24h)
        .collect();

    if changes.is_empty() {
        return Err(FetchError::Invalid(
            "no 24h changes in markets payload".to_string(),
        ));
    }

    Ok(BreadthSnapshot::from_changes(&changes))
}

/// Parse a `/global` payload.
pub fn parse_global(body: &str) -> Result<GlobalMetrics, FetchError> {
    let response: CoinGeckoGlobalResponse = serde_json::from_str(body)?;
    let data = response.data;

    let total_market_cap = data
        .total_market_cap
        .get("usd")
        .copied()
        .ok_or_else(|| FetchError::Invalid("global payload missing usd market cap".to_string()))?;

    let last_updated = data
        .updated_at
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339();

    Ok(GlobalMetrics {
        total_market_cap,
        total_volume_24h: data.total_volume.get("usd").copied().unwrap_or(0.0),
        btc_dominance: data.market_cap_percentage.get("btc").copied().unwrap_or(0.0),
        eth_dominance: data.market_cap_percentage.get("eth").copied().unwrap_or(0.0),
        active_cryptocurrencies: data.active_cryptocurrencies,
        market_cap_change_24h: data.market_cap_change_percentage_24h_usd.unwrap_or(0.0),
        last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> CoinGeckoClient {
        let ttl = Duration::from_secs(60);
        CoinGeckoClient::new(
            Client::new(),
            None,
            365,
            50,
            Arc::new(Cache::new(ttl)),
            Arc::new(Cache::new(ttl)),
            Arc::new(Cache::new(ttl)),
        )
    }

    #[test]
    fn test_invalidate_drops_asset_history_and_breadth() {
        let client = client();
        let btc = TrackedAsset::default_asset();
        let eth = TrackedAsset::find("eth").unwrap();

        client
            .history_cache
            .set(client.history_key(&btc), MarketHistory::default());
        client
            .history_cache
            .set(client.history_key(&eth), MarketHistory::default());
        client
            .breadth_cache
            .set(client.breadth_key(), BreadthSnapshot::from_changes(&[1.0]));

        client.invalidate(&btc);

        assert!(client.history_cache.get(&client.history_key(&btc)).is_none());
        assert!(client.history_cache.get(&client.history_key(&eth)).is_some());
        assert!(client.breadth_cache.is_empty());
    }

    #[test]
    fn test_parse_market_chart_sorts_ascending() {
        let body = r#"{
            "prices": [[3000, 102.0], [1000, 100.0], [2000, 101.0]],
            "market_caps": [],
            "total_volumes": [[1000, 5.0], [2000, 6.0], [3000, 7.0]]
        }"#;
        let history = parse_market_chart(body).unwrap();
        assert_eq!(history.closes(), vec![100.0, 101.0, 102.0]);
        assert_eq!(history.volume_values(), vec![5.0, 6.0, 7.0]);
        assert_eq!(history.prices[0].time, 1000);
    }

    #[test]
    fn test_parse_market_chart_rejects_empty_prices() {
        let body = r#"{"prices": [], "total_volumes": []}"#;
        assert!(matches!(parse_market_chart(body), Err(FetchError::Invalid(_))));
    }

    #[test]
    fn test_parse_market_chart_rejects_garbage() {
        assert!(matches!(
            parse_market_chart(r#"{"status": "rate limited"}"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_alt_breadth_excludes_bitcoin() {
        let body = r#"[
            {"id": "bitcoin", "symbol": "btc", "price_change_percentage_24h": 5.0},
            {"id": "ethereum", "symbol": "eth", "price_change_percentage_24h": 1.0},
            {"id": "solana", "symbol": "sol", "price_change_percentage_24h": -2.0},
            {"id": "ripple", "symbol": "xrp", "price_change_percentage_24h": 0.4},
            {"id": "cardano", "symbol": "ada", "price_change_percentage_24h": null}
        ]"#;
        let snapshot = parse_alt_breadth(body, 50).unwrap();
        assert_eq!(snapshot.sampled, 3);
        assert_eq!(snapshot.advancing, 2);
    }

    #[test]
    fn test_parse_alt_breadth_respects_sample_size() {
        let body = r#"[
            {"id": "ethereum", "price_change_percentage_24h": -1.0},
            {"id": "solana", "price_change_percentage_24h": 2.0},
            {"id": "ripple", "price_change_percentage_24h": 3.0}
        ]"#;
        let snapshot = parse_alt_breadth(body, 2).unwrap();
        assert_eq!(snapshot.sampled, 2);
        assert_eq!(snapshot.advancing, 1);
    }

    #[test]
    fn test_parse_alt_breadth_no_data() {
        let body = r#"[{"id": "bitcoin", "price_change_percentage_24h": 1.0}]"#;
        assert!(parse_alt_breadth(body, 50).is_err());
    }

    #[test]
    fn test_parse_global() {
        let body = r#"{"data": {
            "active_cryptocurrencies": 12000,
            "total_market_cap": {"usd": 2500000000000.0, "eur": 2300000000000.0},
            "total_volume": {"usd": 90000000000.0},
            "market_cap_percentage": {"btc": 52.1, "eth": 16.8},
            "market_cap_change_percentage_24h_usd": -1.25,
            "updated_at": 1700000000
        }}"#;
        let metrics = parse_global(body).unwrap();
        assert_eq!(metrics.active_cryptocurrencies, 12000);
        assert_eq!(metrics.btc_dominance, 52.1);
        assert_eq!(metrics.eth_dominance, 16.8);
        assert_eq!(metrics.market_cap_change_24h, -1.25);
        assert!(metrics.last_updated.starts_with("2023-11-14"));
    }

    #[test]
    fn test_parse_global_missing_usd() {
        let body = r#"{"data": {"total_market_cap": {"eur": 1.0}}}"#;
        assert!(matches!(parse_global(body), Err(FetchError::Invalid(_))));
    }
}
