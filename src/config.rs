use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Cache lifetimes for upstream data and computed results.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Computed gate results.
    pub gate_ttl_secs: u64,
    /// Price history, breadth, funding and global metrics.
    pub indicator_ttl_secs: u64,
    /// Fear & Greed index (updates daily upstream).
    pub fear_greed_ttl_secs: u64,
    /// Interval of the expired-entry sweep.
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            gate_ttl_secs: 300,
            indicator_ttl_secs: 300,
            fear_greed_ttl_secs: 3600,
            cleanup_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn gate_ttl(&self) -> Duration {
        Duration::from_secs(self.gate_ttl_secs)
    }

    pub fn indicator_ttl(&self) -> Duration {
        Duration::from_secs(self.indicator_ttl_secs)
    }

    pub fn fear_greed_ttl(&self) -> Duration {
        Duration::from_secs(self.fear_greed_ttl_secs)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// CoinGecko API key (optional, for pro tier).
    pub coingecko_api_key: Option<String>,
    /// Per-upstream request timeout (ms).
    pub fetch_timeout_ms: u64,
    /// Days of daily history requested for scoring.
    pub history_days: u32,
    /// Number of altcoins sampled for breadth.
    pub breadth_sample_size: usize,
    /// Cache lifetimes.
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            coingecko_api_key: None,
            fetch_timeout_ms: 8_000,
            history_days: 365,
            breadth_sample_size: 50,
            cache: CacheConfig::default(),
        }
    }
}

/// Parse an env var, keeping `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            coingecko_api_key: env::var("COINGECKO_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            fetch_timeout_ms: env_or("FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms),
            history_days: env_or("HISTORY_DAYS", defaults.history_days),
            breadth_sample_size: env_or("BREADTH_SAMPLE_SIZE", defaults.breadth_sample_size),
            cache: CacheConfig {
                gate_ttl_secs: env_or("GATE_CACHE_TTL_SECS", defaults.cache.gate_ttl_secs),
                indicator_ttl_secs: env_or(
                    "INDICATOR_CACHE_TTL_SECS",
                    defaults.cache.indicator_ttl_secs,
                ),
                fear_greed_ttl_secs: env_or(
                    "FEAR_GREED_CACHE_TTL_SECS",
                    defaults.cache.fear_greed_ttl_secs,
                ),
                cleanup_interval_secs: env_or(
                    "CACHE_CLEANUP_INTERVAL_SECS",
                    defaults.cache.cleanup_interval_secs,
                ),
            },
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
