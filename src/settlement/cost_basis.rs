use rust_decimal::Decimal;
use crate::error::{Error, Result};
use crate::interfaces::ledger_store::HoldingChange;
use crate::types::holding::Holding;
use crate::types::ids::UserId;
use crate::types::price::Price;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;
use crate::types::timestamp::Timestamp;

pub struct CostBasisCalculator;

impl CostBasisCalculator {
    /// (q_old * avg_old + q_new * p) / (q_old + q_new)
    pub fn weighted_average(
        held: Quantity,
        avg_cost_basis: Decimal,
        bought: Quantity,
        price: Price,
    ) -> Option<Decimal> {
        let held_cost = held.to_decimal().checked_mul(avg_cost_basis)?;
        let bought_cost = bought.to_decimal().checked_mul(price.to_decimal())?;
        let total = held.checked_add(bought)?;
        held_cost
            .checked_add(bought_cost)?
            .checked_div(total.to_decimal())
    }

    /// Holding after a buy: opened at the fill price, or re-averaged.
    pub fn apply_buy(
        existing: Option<&Holding>,
        user_id: &UserId,
        symbol: &Symbol,
        quantity: Quantity,
        price: Price,
    ) -> Result<Holding> {
        let Some(holding) = existing else {
            return Ok(Holding::open(user_id.clone(), symbol.clone(), quantity, price));
        };

        let new_quantity = holding
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| Error::overflow("holding quantity"))?;
        let avg_cost_basis =
            Self::weighted_average(holding.quantity, holding.avg_cost_basis, quantity, price)
                .ok_or_else(|| Error::overflow("cost basis"))?;

        Ok(Holding {
            quantity: new_quantity,
            avg_cost_basis,
            updated_at: Timestamp::now(),
            ..holding.clone()
        })
    }

    /// Sells never move the average; a fully sold holding is removed.
    /// Callers must already have checked `quantity <= holding.quantity`.
    pub fn apply_sell(holding: &Holding, quantity: Quantity) -> HoldingChange {
        match holding.quantity.remaining_after(quantity) {
            Some(remaining) => HoldingChange::Upsert(Holding {
                quantity: remaining,
                updated_at: Timestamp::now(),
                ..holding.clone()
            }),
            None => HoldingChange::Remove {
                user_id: holding.user_id.clone(),
                symbol: holding.symbol.clone(),
            },
        }
    }
}
