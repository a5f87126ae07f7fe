use futures::future::join_all;
use serde::Serialize;
use crate::interfaces::price_oracle::PriceOracle;
use crate::types::price::Price;
use crate::types::symbol::Symbol;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: Symbol,
    /// `None` when the oracle could not produce a price.
    pub price: Option<Price>,
}

/// Quotes every symbol concurrently, returned in input order.
pub async fn quote_watchlist(oracle: &dyn PriceOracle, symbols: &[Symbol]) -> Vec<Quote> {
    let lookups = join_all(symbols.iter().map(|symbol| oracle.get_price(symbol))).await;

    symbols
        .iter()
        .zip(lookups)
        .map(|(symbol, lookup)| {
            if let Err(reason) = lookup {
                tracing::debug!("No quote for {}: {}", symbol, reason);
            }
            Quote {
                symbol: symbol.clone(),
                price: lookup.ok(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_infra::connectors::static_feed::StaticPriceFeed;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn preserves_order_and_marks_missing_quotes() {
        let feed = StaticPriceFeed::new();
        let symbols: Vec<Symbol> = ["MSFT", "ZZZ", "AAPL"]
            .iter()
            .map(|raw| Symbol::parse(raw).unwrap())
            .collect();
        feed.set_price(symbols[0].clone(), dec!(400));
        feed.set_price(symbols[2].clone(), dec!(190));

        let quotes = quote_watchlist(&feed, &symbols).await;

        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].symbol, symbols[0]);
        assert_eq!(quotes[0].price, Price::new(dec!(400)));
        assert_eq!(quotes[1].price, None);
        assert_eq!(quotes[2].price, Price::new(dec!(190)));
    }
}
