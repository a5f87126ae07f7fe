use rust_decimal::Decimal;
use crate::types::holding::Holding;
use crate::types::price::Price;
use crate::types::quantity::Quantity;

pub struct PnLCalculator;

impl PnLCalculator {
    /// Calculate market value of a quantity at a quoted price
    pub fn market_value(quantity: Quantity, price: Price) -> Option<Decimal> {
        quantity.to_decimal().checked_mul(price.to_decimal())
    }

    /// Calculate unrealized PnL for a holding: (price - avg_cost_basis) * quantity
    pub fn unrealized_pnl(holding: &Holding, price: Price) -> Option<Decimal> {
        price
            .to_decimal()
            .checked_sub(holding.avg_cost_basis)?
            .checked_mul(holding.quantity.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids::UserId;
    use crate::types::symbol::Symbol;
    use rust_decimal_macros::dec;

    #[test]
    fn pnl_is_signed() {
        let holding = Holding::open(
            UserId::from("alice"),
            Symbol::parse("AAPL").unwrap(),
            Quantity::from_u64(10).unwrap(),
            Price::new(dec!(80)).unwrap(),
        );
        assert_eq!(
            PnLCalculator::unrealized_pnl(&holding, Price::new(dec!(95.5)).unwrap()),
            Some(dec!(155))
        );
        assert_eq!(
            PnLCalculator::unrealized_pnl(&holding, Price::new(dec!(20)).unwrap()),
            Some(dec!(-600))
        );
    }

    #[test]
    fn market_value_multiplies() {
        assert_eq!(
            PnLCalculator::market_value(Quantity::from_u64(3).unwrap(), Price::new(dec!(1.25)).unwrap()),
            Some(dec!(3.75))
        );
    }
}
