use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleProvider {
    Static,
    AlphaVantage,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleConfig {
    pub provider: OracleProvider,
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Zero disables the quote cache.
    pub cache_ttl_secs: u64,
    pub rate_limit_cooldown_secs: u64,
    pub static_prices: HashMap<String, Decimal>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            provider: OracleProvider::Static,
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: "demo".to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 60,
            rate_limit_cooldown_secs: 60,
            static_prices: HashMap::new(),
        }
    }
}
