use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::logging::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};
use crate::types::ids::{OperationId, UserId};
use crate::types::transaction::Side;

pub fn trace_trade(operation_id: &OperationId, user_id: &UserId, symbol: &str, side: Side) -> Span {
    tracing::info_span!(
        "trade",
        operation_id = %operation_id,
        user_id = %user_id,
        symbol = %symbol,
        side = %side,
    )
}

pub fn trace_deposit(operation_id: &OperationId, user_id: &UserId) -> Span {
    tracing::info_span!(
        "deposit",
        operation_id = %operation_id,
        user_id = %user_id,
    )
}

pub fn trace_valuation(user_id: &UserId) -> Span {
    tracing::debug_span!("valuation", user_id = %user_id)
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::ConfigError(format!("invalid log filter: {}", e)))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| Error::ConfigError(format!("tracing init failed: {}", e)))
}
