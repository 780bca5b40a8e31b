use crate::services::Cache;
use crate::sources::{read_body, FetchError};
use crate::types::FearGreedData;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const FEAR_GREED_API_URL: &str = "https://api.alternative.me/fng/?limit=1";
const CACHE_KEY: &str = "fear_greed";

/// alternative.me response: `{ "data": [{ "value": "25", ... }] }`
#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: Option<String>,
    #[serde(default)]
    timestamp: String,
}

/// Fear & Greed Index client (free, no API key required).
#[derive(Clone)]
pub struct AlternativeMeClient {
    client: Client,
    cache: Arc<Cache<FearGreedData>>,
}

impl AlternativeMeClient {
    pub fn new(client: Client, cache: Arc<Cache<FearGreedData>>) -> Self {
        Self { client, cache }
    }

    /// Forget the cached reading.
    pub fn invalidate(&self) {
        self.cache.remove(CACHE_KEY);
    }

    /// Current Fear & Greed reading.
    pub async fn get_fear_greed(&self) -> Result<FearGreedData, FetchError> {
        self.cache
            .get_or_try_insert_with(CACHE_KEY, || async move {
                let response = self.client.get(FEAR_GREED_API_URL).send().await?;
                let body = read_body("alternative.me", response).await?;
                let data = parse_fear_greed(&body)?;
                debug!("Fear & Greed = {} ({})", data.value, data.classification);
                Ok(data)
            })
            .await
    }
}

/// Parse an alternative.me `/fng` payload.
pub fn parse_fear_greed(body: &str) -> Result<FearGreedData, FetchError> {
    let response: FngResponse = serde_json::from_str(body)?;
    let entry = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Invalid("fear & greed payload has no entries".to_string()))?;

    let value: u8 = entry
        .value
        .trim()
        .parse()
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| FetchError::Invalid(format!("fear & greed value {:?}", entry.value)))?;

    Ok(FearGreedData {
        value,
        classification: entry
            .value_classification
            .unwrap_or_else(|| FearGreedData::classify(value).to_string()),
        timestamp: entry.timestamp,
    })
}
