use serde::{Deserialize, Serialize};

/// Assets the gate can be computed for.
///
/// Each entry maps a lowercase ticker to its CoinGecko id and the Binance
/// USDT-margined perpetual used for the funding rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedAsset {
    pub symbol: &'static str,
    pub coingecko_id: &'static str,
    pub perp_pair: &'static str,
}

pub const TRACKED_ASSETS: &[TrackedAsset] = &[
    TrackedAsset {
        symbol: "btc",
        coingecko_id: "bitcoin",
        perp_pair: "BTCUSDT",
    },
    TrackedAsset {
        symbol: "eth",
        coingecko_id: "ethereum",
        perp_pair: "ETHUSDT",
    },
    TrackedAsset {
        symbol: "sol",
        coingecko_id: "solana",
        perp_pair: "SOLUSDT",
    },
    TrackedAsset {
        symbol: "bnb",
        coingecko_id: "binancecoin",
        perp_pair: "BNBUSDT",
    },
    TrackedAsset {
        symbol: "xrp",
        coingecko_id: "ripple",
        perp_pair: "XRPUSDT",
    },
];

impl TrackedAsset {
    /// Look up an asset by ticker (case-insensitive).
    pub fn find(symbol: &str) -> Option<TrackedAsset> {
        let lower = symbol.trim().to_lowercase();
        TRACKED_ASSETS.iter().find(|a| a.symbol == lower).copied()
    }

    /// The asset scored when no symbol is requested.
    pub fn default_asset() -> TrackedAsset {
        TRACKED_ASSETS[0]
    }
}

/// A single timestamped observation (unix ms, value).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

/// Daily close and volume history for one asset, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketHistory {
    pub prices: Vec<SeriesPoint>,
    pub volumes: Vec<SeriesPoint>,
}

impl MarketHistory {
    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.value).collect()
    }

    /// Volumes in chronological order.
    pub fn volume_values(&self) -> Vec<f64> {
        self.volumes.iter().map(|p| p.value).collect()
    }
}

/// Fear & Greed Index data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FearGreedData {
    #[serde(default = "default_fear_greed_value")]
    pub value: u8,
    #[serde(default = "default_classification")]
    pub classification: String,
    #[serde(default)]
    pub timestamp: String,
}

fn default_fear_greed_value() -> u8 {
    50
}

fn default_classification() -> String {
    "Neutral".to_string()
}

impl Default for FearGreedData {
    fn default() -> Self {
        Self {
            value: default_fear_greed_value(),
            classification: default_classification(),
            timestamp: String::new(),
        }
    }
}

impl FearGreedData {
    /// Get the classification for a fear & greed value.
    pub fn classify(value: u8) -> &'static str {
        match value {
            0..=24 => "Extreme Fear",
            25..=44 => "Fear",
            45..=55 => "Neutral",
            56..=75 => "Greed",
            _ => "Extreme Greed",
        }
    }
}

/// Latest perpetual funding rate for a pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingSnapshot {
    pub symbol: String,
    /// Decimal rate per funding interval (0.0001 = 0.01%).
    pub rate: f64,
    pub mark_price: Option<f64>,
    /// Next funding time (unix ms).
    pub next_funding_time: Option<i64>,
}

/// Share of large-cap altcoins that are up over the last 24h.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreadthSnapshot {
    /// Coins with a reported 24h change.
    pub sampled: usize,
    /// Coins with a positive 24h change.
    pub advancing: usize,
    /// advancing / sampled, in [0, 1].
    pub ratio: f64,
}

impl BreadthSnapshot {
    /// Build a snapshot from a list of 24h percentage changes.
    pub fn from_changes(changes: &[f64]) -> Self {
        let sampled = changes.len();
        let advancing = changes.iter().filter(|c| **c > 0.0).count();
        let ratio = if sampled == 0 {
            0.0
        } else {
            advancing as f64 / sampled as f64
        };
        Self {
            sampled,
            advancing,
            ratio,
        }
    }
}

/// Global cryptocurrency market metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMetrics {
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    pub active_cryptocurrencies: i64,
    pub market_cap_change_24h: f64,
    pub last_updated: String,
}
