pub mod cache;
pub mod circuit_breaker;
pub mod connectors;
pub mod watchlist;

use std::sync::Arc;
use std::time::Duration;
use crate::config::oracle::{OracleConfig, OracleProvider};
use crate::error::Result;
use crate::interfaces::price_oracle::PriceOracle;
use crate::price_infra::cache::CachedPriceOracle;
use crate::price_infra::connectors::alpha_vantage::AlphaVantageConnector;
use crate::price_infra::connectors::static_feed::StaticPriceFeed;

/// Builds the configured quote source, wrapped in the TTL cache unless the
/// TTL is zero.
pub fn build_oracle(config: &OracleConfig) -> Result<Arc<dyn PriceOracle>> {
    let source: Arc<dyn PriceOracle> = match config.provider {
        OracleProvider::Static => Arc::new(StaticPriceFeed::from_config(&config.static_prices)?),
        OracleProvider::AlphaVantage => Arc::new(AlphaVantageConnector::new(config)?),
    };
    tracing::info!(
        "Price oracle: {:?}, cache ttl {}s",
        config.provider,
        config.cache_ttl_secs
    );

    if config.cache_ttl_secs == 0 {
        return Ok(source);
    }
    Ok(Arc::new(CachedPriceOracle::new(
        source,
        Duration::from_secs(config.cache_ttl_secs),
    )))
}
