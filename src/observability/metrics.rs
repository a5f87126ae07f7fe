use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};
use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ledger metrics
    pub static ref TRADES_EXECUTED: IntCounterVec = IntCounterVec::new(
        Opts::new("ledger_trades_executed_total", "Total number of trades executed"),
        &["side"]
    ).unwrap();

    pub static ref OPERATIONS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("ledger_operations_rejected_total", "Total number of rejected ledger operations"),
        &["operation", "reason"]
    ).unwrap();

    pub static ref DEPOSITS_APPLIED: IntCounter = IntCounter::new(
        "ledger_deposits_total",
        "Total number of deposits applied"
    ).unwrap();

    // Oracle metrics
    pub static ref ORACLE_LOOKUPS_FAILED: IntCounterVec = IntCounterVec::new(
        Opts::new("oracle_lookups_failed_total", "Total number of failed price lookups"),
        &["reason"]
    ).unwrap();

    pub static ref ORACLE_CACHE_HITS: IntCounter = IntCounter::new(
        "oracle_cache_hits_total",
        "Total number of quotes served from cache"
    ).unwrap();

    // Latency metrics
    pub static ref TRADE_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ledger_trade_latency_seconds",
            "Trade latency including the price lookup"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRADES_EXECUTED.clone()),
        Box::new(OPERATIONS_REJECTED.clone()),
        Box::new(DEPOSITS_APPLIED.clone()),
        Box::new(ORACLE_LOOKUPS_FAILED.clone()),
        Box::new(ORACLE_CACHE_HITS.clone()),
        Box::new(TRADE_LATENCY.clone()),
    ];
    for collector in collectors {
        REGISTRY
            .register(collector)
            .map_err(|e| Error::ConfigError(format!("metric registration failed: {}", e)))?;
    }
    Ok(())
}
