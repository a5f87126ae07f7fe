use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cash amount in account currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Decimal);

impl Balance {
    pub fn from_decimal(value: Decimal) -> Self {
        Balance(value)
    }

    pub fn to_decimal(&self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Balance(Decimal::ZERO)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn checked_add(self, other: Balance) -> Option<Balance> {
        self.0.checked_add(other.0).map(Balance)
    }

    pub fn checked_sub(self, other: Balance) -> Option<Balance> {
        self.0.checked_sub(other.0).map(Balance)
    }
}

impl From<Decimal> for Balance {
    fn from(value: Decimal) -> Self {
        Balance(value)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn repeated_debits_do_not_drift() {
        let mut balance = Balance::from_decimal(dec!(1.00));
        for _ in 0..10 {
            balance = balance.checked_sub(Balance::from_decimal(dec!(0.10))).unwrap();
        }
        assert_eq!(balance, Balance::zero());
        assert!(!balance.is_negative());
    }

    #[test]
    fn display_honours_precision() {
        let balance = Balance::from_decimal(dec!(250));
        assert_eq!(format!("{:.2}", balance), "250.00");
    }
}
