//! Upstream market data clients.
//!
//! Each client validates its payload into explicit structs at the fetch
//! boundary and reports failures as [`FetchError`].

pub mod alternative_me;
pub mod binance;
pub mod coingecko;

pub use alternative_me::AlternativeMeClient;
pub use binance::BinanceFuturesClient;
pub use coingecko::CoinGeckoClient;

use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Failure of a single upstream fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{upstream} returned HTTP {status}")]
    Status { upstream: &'static str, status: u16 },

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    Invalid(String),
}

/// Build the shared HTTP client used by every source.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent("MarketGate/1.0 (Crypto Market Health)")
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Read a response body, turning non-2xx statuses into [`FetchError::Status`].
pub(crate) async fn read_body(
    source: &'static str,
    response: Response,
) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let snippet: String = text.chars().take(200).collect();
        warn!("{} returned {}: {}", source, status, snippet);
        return Err(FetchError::Status {
            upstream: source,
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}
