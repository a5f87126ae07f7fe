use anyhow::Context;
use std::sync::Arc;
use portfolio_ledger::config::loader::AppConfig;
use portfolio_ledger::core::engine::LedgerEngine;
use portfolio_ledger::invariants::checks::InvariantChecks;
use portfolio_ledger::observability::metrics::register_metrics;
use portfolio_ledger::observability::tracing::init_tracing;
use portfolio_ledger::price_infra::build_oracle;
use portfolio_ledger::price_infra::watchlist::quote_watchlist;
use portfolio_ledger::settlement::open_store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("LEDGER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    register_metrics()?;
    tracing::info!("Starting portfolio ledger ({})", env);

    let store = open_store(&config.store).context("opening ledger store")?;
    let oracle = build_oracle(&config.oracle).context("building price oracle")?;
    let engine = LedgerEngine::new(store, Arc::clone(&oracle));

    InvariantChecks::check_all(engine.store()).context("ledger invariants")?;

    let symbols = config.watchlist_symbols()?;
    for quote in quote_watchlist(oracle.as_ref(), &symbols).await {
        match quote.price {
            Some(price) => tracing::info!(symbol = %quote.symbol, %price, "quote"),
            None => tracing::warn!(symbol = %quote.symbol, "quote unavailable"),
        }
    }

    Ok(())
}
