use crate::config::logging::LoggingConfig;
use crate::config::oracle::OracleConfig;
use crate::config::store::StoreConfig;
use crate::error::{Error, Result};
use crate::types::symbol::Symbol;
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_WATCHLIST: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM", "V", "WMT",
];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub watchlist: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            oracle: OracleConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    /// Layers `{dir}/default`, then `{dir}/{env}`, then `LEDGER_*` variables
    /// (`LEDGER_ORACLE__API_KEY` sets `oracle.api_key`).
    pub fn load_from(dir: &str, env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(
                Environment::with_prefix("LEDGER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    pub fn watchlist_symbols(&self) -> Result<Vec<Symbol>> {
        self.watchlist.iter().map(|raw| Symbol::parse(raw)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::oracle::OracleProvider;
    use crate::config::store::StoreBackend;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().to_str().unwrap(), "test").unwrap();
        assert_eq!(config.oracle.provider, OracleProvider::Static);
        assert_eq!(config.oracle.timeout_secs, 5);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.watchlist.len(), 10);
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
            watchlist = ["AAPL"]

            [oracle]
            provider = "static"
            cache_ttl_secs = 30

            [oracle.static_prices]
            AAPL = "150.25"
            "#,
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            r#"
            [oracle]
            provider = "alpha_vantage"

            [store]
            backend = "sqlite"
            sqlite_path = "/tmp/ledger.db"
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path().to_str().unwrap(), "staging").unwrap();
        assert_eq!(config.oracle.provider, OracleProvider::AlphaVantage);
        assert_eq!(config.oracle.cache_ttl_secs, 30);
        let aapl = config
            .oracle
            .static_prices
            .iter()
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case("AAPL"))
            .map(|(_, price)| *price);
        assert_eq!(aapl, Some(dec!(150.25)));
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.watchlist_symbols().unwrap().len(), 1);
    }

    #[test]
    fn bad_watchlist_symbol_is_reported() {
        let config = AppConfig {
            watchlist: vec!["AAPL".to_string(), "not a symbol".to_string()],
            ..AppConfig::default()
        };
        assert!(matches!(config.watchlist_symbols(), Err(Error::InvalidSymbol(_))));
    }
}
