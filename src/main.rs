use market_gate::config::Config;
use market_gate::services::{Cache, LiveFeed, MarketFeed, MarketGateService};
use market_gate::sources::{self, AlternativeMeClient, BinanceFuturesClient, CoinGeckoClient};
use market_gate::{api, AppState};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Market Gate server on {}", config.bind_addr());

    // Upstream clients share one HTTP client; each owns its cache.
    let http = sources::http_client(config.fetch_timeout());
    let indicator_ttl = config.cache.indicator_ttl();

    let coingecko = CoinGeckoClient::new(
        http.clone(),
        config.coingecko_api_key.clone(),
        config.history_days,
        config.breadth_sample_size,
        Arc::new(Cache::new(indicator_ttl)),
        Arc::new(Cache::new(indicator_ttl)),
        Arc::new(Cache::new(indicator_ttl)),
    );
    if config.coingecko_api_key.is_some() {
        info!("CoinGecko API key found, using pro endpoint");
    }
    let binance = BinanceFuturesClient::new(http.clone(), Arc::new(Cache::new(indicator_ttl)));
    let alternative_me =
        AlternativeMeClient::new(http, Arc::new(Cache::new(config.cache.fear_greed_ttl())));

    let feed: Arc<dyn MarketFeed> = Arc::new(LiveFeed::new(coingecko, binance, alternative_me));

    let market_gate = MarketGateService::new(
        feed.clone(),
        Arc::new(Cache::new(config.cache.gate_ttl())),
        config.fetch_timeout(),
    );

    // Sweep expired gate results
    {
        let cache = market_gate.cache();
        let interval = config.cache.cleanup_interval_secs.max(1);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                let evicted = cache.cleanup();
                if evicted > 0 {
                    debug!("Evicted {} expired market gate results", evicted);
                }
            }
        });
    }

    // Create application state
    let state = AppState {
        config: config.clone(),
        feed,
        market_gate,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Market Gate server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
