use rust_decimal::Decimal;
use thiserror::Error;
use crate::interfaces::price_oracle::Unavailable;
use crate::types::balance::Balance;
use crate::types::ids::UserId;
use crate::types::symbol::Symbol;

#[derive(Error, Debug)]
pub enum Error {
    // Request Validation Errors
    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount {
        amount: Decimal,
    },

    #[error("Invalid quantity: {quantity} (must be a positive whole number)")]
    InvalidQuantity {
        quantity: i64,
    },

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Invalid identity: must not be blank")]
    InvalidIdentity,

    // Account Errors
    #[error("Unknown account: {0}")]
    UnknownAccount(UserId),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(UserId),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Price Errors
    #[error("Price unavailable for {symbol}: {reason}")]
    PriceUnavailable {
        symbol: Symbol,
        reason: Unavailable,
    },

    // Settlement Errors
    #[error("Insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        balance: Balance,
        required: Balance,
    },

    #[error("Insufficient shares of {symbol}: held={held}, requested={requested}")]
    InsufficientShares {
        symbol: Symbol,
        held: u64,
        requested: u64,
    },

    #[error("No holding in {symbol}")]
    NoSuchHolding {
        symbol: Symbol,
    },

    // Storage Errors
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    // Invariant Errors
    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),

    // Arithmetic Errors
    #[error("Overflow in {operation}")]
    Overflow { operation: String },

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidAmount { .. } => "invalid_amount",
            Error::InvalidQuantity { .. } => "invalid_quantity",
            Error::InvalidSymbol(_) => "invalid_symbol",
            Error::InvalidIdentity => "invalid_identity",
            Error::UnknownAccount(_) => "unknown_account",
            Error::AccountAlreadyExists(_) => "account_already_exists",
            Error::InvalidCredentials => "invalid_credentials",
            Error::PriceUnavailable { .. } => "price_unavailable",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::InsufficientShares { .. } => "insufficient_shares",
            Error::NoSuchHolding { .. } => "no_such_holding",
            Error::StorageFailure(_) => "storage_failure",
            Error::InvariantViolation(_) => "invariant_violation",
            Error::Overflow { .. } => "overflow",
            Error::ConfigError(_) => "config_error",
        }
    }

    pub(crate) fn overflow(operation: &str) -> Self {
        Error::Overflow { operation: operation.to_string() }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::StorageFailure(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::StorageFailure(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub details: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.details)
    }
}
