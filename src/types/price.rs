use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::balance::Balance;
use crate::types::quantity::Quantity;

/// Strictly positive execution or quote price.
///
/// A zero or negative number cannot be turned into a `Price`, so nothing
/// downstream of an oracle can trade at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Price(value))
        } else {
            None
        }
    }

    pub fn to_decimal(&self) -> Decimal {
        self.0
    }

    /// `price × quantity`, or `None` on overflow.
    pub fn notional(&self, quantity: Quantity) -> Option<Balance> {
        self.0
            .checked_mul(quantity.to_decimal())
            .map(Balance::from_decimal)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value).ok_or_else(|| format!("price must be positive, got {value}"))
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_zero_and_negative() {
        assert!(Price::new(dec!(0)).is_none());
        assert!(Price::new(dec!(-1.5)).is_none());
        assert!(Price::new(dec!(0.0001)).is_some());
    }

    #[test]
    fn notional_is_exact() {
        let price = Price::new(dec!(150.10)).unwrap();
        let quantity = Quantity::from_u64(3).unwrap();
        assert_eq!(price.notional(quantity), Some(Balance::from_decimal(dec!(450.30))));
    }

    #[test]
    fn deserializing_rejects_non_positive() {
        assert!(serde_json::from_str::<Price>("\"0\"").is_err());
        let price: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(price.to_decimal(), dec!(12.5));
    }
}
