use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use crate::error::Result;
use crate::interfaces::price_oracle::{PriceLookup, PriceOracle, Unavailable};
use crate::types::price::Price;
use crate::types::symbol::Symbol;

/// Fixed quotes held in memory. Prices can be changed at runtime, which makes
/// this the oracle of choice for tests and offline runs.
#[derive(Default)]
pub struct StaticPriceFeed {
    prices: DashMap<Symbol, Decimal>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        StaticPriceFeed::default()
    }

    /// Builds a feed from configured `symbol -> price` pairs. Symbols are
    /// normalized; prices are kept as given so a bad one surfaces as
    /// `NonPositive` at lookup time.
    pub fn from_config(prices: &HashMap<String, Decimal>) -> Result<Self> {
        let feed = StaticPriceFeed::new();
        for (raw, price) in prices {
            feed.set_price(Symbol::parse(raw)?, *price);
        }
        Ok(feed)
    }

    pub fn set_price(&self, symbol: Symbol, price: Decimal) {
        self.prices.insert(symbol, price);
    }

    pub fn remove_price(&self, symbol: &Symbol) {
        self.prices.remove(symbol);
    }
}

#[async_trait]
impl PriceOracle for StaticPriceFeed {
    async fn get_price(&self, symbol: &Symbol) -> PriceLookup {
        let quoted = self.prices.get(symbol).map(|entry| *entry.value());
        match quoted {
            Some(price) => Price::new(price).ok_or(Unavailable::NonPositive),
            None => Err(Unavailable::NotFound),
        }
    }
}
