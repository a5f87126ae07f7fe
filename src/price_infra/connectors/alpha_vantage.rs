use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use crate::config::oracle::OracleConfig;
use crate::error::{Error, Result};
use crate::interfaces::price_oracle::{PriceLookup, PriceOracle, Unavailable};
use crate::price_infra::circuit_breaker::QuotaBreaker;
use crate::types::price::Price;
use crate::types::symbol::Symbol;

const GLOBAL_QUOTE: &str = "Global Quote";
const PRICE_FIELD: &str = "05. price";

/// Quote connector for the Alpha Vantage `GLOBAL_QUOTE` endpoint.
///
/// One request per lookup, never retried. Every failure mode maps to an
/// [`Unavailable`] reason; a rate-limit answer also trips the quota breaker.
pub struct AlphaVantageConnector {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    breaker: QuotaBreaker,
}

impl AlphaVantageConnector {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(AlphaVantageConnector {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            breaker: QuotaBreaker::new(Duration::from_secs(config.rate_limit_cooldown_secs)),
        })
    }

    async fn fetch(&self, symbol: &Symbol) -> PriceLookup {
        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Alpha Vantage request for {} failed: {}", symbol, e);
                Unavailable::Network
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Unavailable::RateLimited);
        }
        if !status.is_success() {
            tracing::warn!("Alpha Vantage returned {} for {}", status, symbol);
            return Err(Unavailable::Network);
        }

        let body = response.text().await.map_err(|e| {
            tracing::warn!("Alpha Vantage body for {} unreadable: {}", symbol, e);
            Unavailable::Network
        })?;

        parse_global_quote(&body)
    }
}

#[async_trait]
impl PriceOracle for AlphaVantageConnector {
    async fn get_price(&self, symbol: &Symbol) -> PriceLookup {
        if self.breaker.is_active() {
            return Err(Unavailable::RateLimited);
        }

        let lookup = self.fetch(symbol).await;
        if lookup == Err(Unavailable::RateLimited) {
            self.breaker.trigger();
        }
        lookup
    }
}

/// Maps a `GLOBAL_QUOTE` response body to a price or an unavailability reason.
pub fn parse_global_quote(body: &str) -> PriceLookup {
    let value: Value = serde_json::from_str(body).map_err(|_| Unavailable::Malformed)?;
    let Some(root) = value.as_object() else {
        return Err(Unavailable::Malformed);
    };

    if root.contains_key("Note") || root.contains_key("Information") {
        return Err(Unavailable::RateLimited);
    }
    if root.contains_key("Error Message") {
        return Err(Unavailable::NotFound);
    }

    let quote = root
        .get(GLOBAL_QUOTE)
        .and_then(Value::as_object)
        .filter(|quote| !quote.is_empty())
        .ok_or(Unavailable::NotFound)?;

    let price = match quote.get(PRICE_FIELD) {
        Some(Value::String(raw)) => Decimal::from_str(raw.trim()).map_err(|_| Unavailable::NonNumeric)?,
        Some(Value::Number(raw)) => {
            Decimal::from_str(&raw.to_string()).map_err(|_| Unavailable::NonNumeric)?
        }
        Some(_) => return Err(Unavailable::NonNumeric),
        None => return Err(Unavailable::MissingField),
    };

    Price::new(price).ok_or(Unavailable::NonPositive)
}
