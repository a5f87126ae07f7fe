use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::types::ids::UserId;
use crate::types::price::Price;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;
use crate::types::timestamp::Timestamp;

/// A user's position in one symbol. A record only exists while shares are held.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub avg_cost_basis: Decimal,
    pub updated_at: Timestamp,
}

impl Holding {
    pub fn open(user_id: UserId, symbol: Symbol, quantity: Quantity, price: Price) -> Self {
        Holding {
            user_id,
            symbol,
            quantity,
            avg_cost_basis: price.to_decimal(),
            updated_at: Timestamp::now(),
        }
    }

    pub fn view(&self) -> HoldingView {
        HoldingView {
            quantity: self.quantity.to_u64(),
            avg_cost_basis: self.avg_cost_basis,
        }
    }
}

/// What callers see per symbol in `get_holdings`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingView {
    pub quantity: u64,
    pub avg_cost_basis: Decimal,
}
