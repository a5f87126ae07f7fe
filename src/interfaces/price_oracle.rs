use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::price::Price;
use crate::types::symbol::Symbol;

/// Why a quote could not be produced. None of these are fatal to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    Network,
    RateLimited,
    NotFound,
    MissingField,
    NonNumeric,
    NonPositive,
    Malformed,
}

impl Unavailable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unavailable::Network => "network",
            Unavailable::RateLimited => "rate_limited",
            Unavailable::NotFound => "not_found",
            Unavailable::MissingField => "missing_field",
            Unavailable::NonNumeric => "non_numeric",
            Unavailable::NonPositive => "non_positive",
            Unavailable::Malformed => "malformed",
        }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PriceLookup = std::result::Result<Price, Unavailable>;

/// Uniform `price-or-unavailable` contract over any quote source.
///
/// Every call may suspend and may fail. Implementations report failure as
/// [`Unavailable`] rather than retrying.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn get_price(&self, symbol: &Symbol) -> PriceLookup;
}
