use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::types::ids::{TransactionId, UserId};
use crate::types::price::Price;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Side::Buy => "Bought",
            Side::Sell => "Sold",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// A trade waiting to be appended; the store assigns its id on commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Price,
    pub side: Side,
    pub timestamp: Timestamp,
}

impl TradeRecord {
    pub fn new(user_id: UserId, symbol: Symbol, quantity: Quantity, price: Price, side: Side) -> Self {
        TradeRecord {
            user_id,
            symbol,
            quantity,
            price,
            side,
            timestamp: Timestamp::now(),
        }
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            symbol: self.symbol,
            quantity: self.quantity,
            price: self.price,
            side: self.side,
            timestamp: self.timestamp,
        }
    }
}

/// Immutable journal entry for an executed trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Price,
    pub side: Side,
    pub timestamp: Timestamp,
}

/// Most-recent-first: timestamp descending, then id descending.
pub fn sort_most_recent_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}
