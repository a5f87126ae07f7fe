use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use crate::interfaces::price_oracle::{PriceLookup, PriceOracle};
use crate::observability::metrics::ORACLE_CACHE_HITS;
use crate::types::price::Price;
use crate::types::symbol::Symbol;

struct CachedQuote {
    price: Price,
    fetched_at: Instant,
}

/// TTL cache in front of another oracle. Only successful lookups are cached,
/// and an entry older than the TTL is never served.
pub struct CachedPriceOracle {
    inner: Arc<dyn PriceOracle>,
    ttl: Duration,
    entries: DashMap<Symbol, CachedQuote>,
}

impl CachedPriceOracle {
    pub fn new(inner: Arc<dyn PriceOracle>, ttl: Duration) -> Self {
        CachedPriceOracle {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Serves an unexpired entry. An expired one is evicted on sight.
    fn fresh(&self, symbol: &Symbol) -> Option<Price> {
        let expired = match self.entries.get(symbol) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => return Some(entry.price),
            Some(_) => true,
            None => false,
        };
        // The read guard is gone here; removing under it would deadlock the shard
        if expired {
            self.entries
                .remove_if(symbol, |_, entry| entry.fetched_at.elapsed() >= self.ttl);
        }
        None
    }

    pub fn invalidate(&self, symbol: &Symbol) {
        self.entries.remove(symbol);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PriceOracle for CachedPriceOracle {
    async fn get_price(&self, symbol: &Symbol) -> PriceLookup {
        if let Some(price) = self.fresh(symbol) {
            ORACLE_CACHE_HITS.inc();
            return Ok(price);
        }

        let lookup = self.inner.get_price(symbol).await;
        if let Ok(price) = lookup {
            self.entries.insert(
                symbol.clone(),
                CachedQuote {
                    price,
                    fetched_at: Instant::now(),
                },
            );
        }
        lookup
    }
}
