use rust_decimal::Decimal;
use crate::error::{Error, Result};
use crate::types::account::Account;
use crate::types::balance::Balance;
use crate::types::holding::Holding;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;

/// Individual pre-trade checks. The engine decides the order they run in.
pub struct PreTradeCheck;

impl PreTradeCheck {
    pub fn check_amount(amount: Decimal) -> Result<Balance> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount { amount });
        }
        Ok(Balance::from_decimal(amount))
    }

    pub fn check_quantity(quantity: i64) -> Result<Quantity> {
        Quantity::from_i64(quantity).ok_or(Error::InvalidQuantity { quantity })
    }

    pub fn check_funds(account: &Account, cost: Balance) -> Result<()> {
        if account.balance < cost {
            return Err(Error::InsufficientFunds {
                balance: account.balance,
                required: cost,
            });
        }
        Ok(())
    }

    /// The holding must exist and cover the requested quantity.
    pub fn check_shares<'a>(
        holding: Option<&'a Holding>,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<&'a Holding> {
        let holding = holding.ok_or_else(|| Error::NoSuchHolding {
            symbol: symbol.clone(),
        })?;

        if holding.quantity < quantity {
            return Err(Error::InsufficientShares {
                symbol: symbol.clone(),
                held: holding.quantity.to_u64(),
                requested: quantity.to_u64(),
            });
        }
        Ok(holding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids::UserId;
    use crate::types::price::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(matches!(PreTradeCheck::check_amount(dec!(0)), Err(Error::InvalidAmount { .. })));
        assert!(matches!(PreTradeCheck::check_amount(dec!(-5)), Err(Error::InvalidAmount { .. })));
        assert!(PreTradeCheck::check_amount(dec!(0.01)).is_ok());
    }

    #[test]
    fn funds_must_cover_cost_exactly_or_more() {
        let account = Account::new(UserId::from("alice"), None)
            .with_balance(Balance::from_decimal(dec!(100)));
        assert!(PreTradeCheck::check_funds(&account, Balance::from_decimal(dec!(100))).is_ok());
        assert!(matches!(
            PreTradeCheck::check_funds(&account, Balance::from_decimal(dec!(100.01))),
            Err(Error::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn shares_check_distinguishes_missing_from_short() {
        let symbol = Symbol::parse("AAPL").unwrap();
        let holding = Holding::open(
            UserId::from("alice"),
            symbol.clone(),
            Quantity::from_u64(3).unwrap(),
            Price::new(dec!(10)).unwrap(),
        );
        let four = Quantity::from_u64(4).unwrap();

        assert!(matches!(
            PreTradeCheck::check_shares(None, &symbol, four),
            Err(Error::NoSuchHolding { .. })
        ));
        assert!(matches!(
            PreTradeCheck::check_shares(Some(&holding), &symbol, four),
            Err(Error::InsufficientShares { held: 3, requested: 4, .. })
        ));
        assert!(PreTradeCheck::check_shares(Some(&holding), &symbol, Quantity::from_u64(3).unwrap()).is_ok());
    }
}
