use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole number of shares, always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    pub fn from_i64(value: i64) -> Option<Self> {
        u64::try_from(value).ok().and_then(Quantity::from_u64)
    }

    pub fn from_u64(value: u64) -> Option<Self> {
        if value > 0 {
            Some(Quantity(value))
        } else {
            None
        }
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_add(other.0).map(Quantity)
    }

    /// Shares left after removing `other`; `None` when nothing remains.
    pub fn remaining_after(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_sub(other.0).and_then(Quantity::from_u64)
    }
}

impl TryFrom<u64> for Quantity {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Quantity::from_u64(value).ok_or_else(|| "quantity must be positive".to_string())
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_positive_values_are_quantities() {
        assert!(Quantity::from_i64(0).is_none());
        assert!(Quantity::from_i64(-3).is_none());
        assert_eq!(Quantity::from_i64(7).map(|q| q.to_u64()), Some(7));
    }

    #[test]
    fn remaining_after_full_reduction_is_none() {
        let held = Quantity::from_u64(10).unwrap();
        assert_eq!(held.remaining_after(Quantity::from_u64(10).unwrap()), None);
        assert_eq!(
            held.remaining_after(Quantity::from_u64(4).unwrap()),
            Quantity::from_u64(6)
        );
    }
}
