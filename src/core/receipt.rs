use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use crate::types::balance::Balance;
use crate::types::ids::OperationId;
use crate::types::price::Price;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;
use crate::types::transaction::{Side, Transaction};

/// Outcome of an executed buy or sell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeReceipt {
    pub operation_id: OperationId,
    pub side: Side,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Price,
    /// `price × quantity`: debited on a buy, credited on a sell.
    pub gross_amount: Balance,
    pub new_balance: Balance,
    pub transaction: Transaction,
    pub message: String,
}

impl TradeReceipt {
    pub fn new(
        operation_id: OperationId,
        transaction: Transaction,
        gross_amount: Balance,
        new_balance: Balance,
    ) -> Self {
        let message = format!(
            "{} {} x {} at {:.2}. New balance: {:.2}.",
            transaction.side.past_tense(),
            transaction.quantity,
            transaction.symbol,
            to_cents(transaction.price.to_decimal()),
            to_cents(new_balance.to_decimal()),
        );

        TradeReceipt {
            operation_id,
            side: transaction.side,
            symbol: transaction.symbol.clone(),
            quantity: transaction.quantity,
            price: transaction.price,
            gross_amount,
            new_balance,
            transaction,
            message,
        }
    }
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One row of a valued portfolio. Price-derived fields are `None` when no
/// quote was available.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionReport {
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub avg_cost_basis: Decimal,
    pub current_price: Option<Price>,
    pub market_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
}
