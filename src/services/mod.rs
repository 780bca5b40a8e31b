pub mod cache;
pub mod feed;
pub mod market_gate;

pub use cache::Cache;
pub use feed::{LiveFeed, MarketFeed};
pub use market_gate::MarketGateService;
