use crate::error::Result;
use crate::types::account::Account;
use crate::types::holding::Holding;
use crate::types::ids::UserId;
use crate::types::symbol::Symbol;
use crate::types::transaction::{TradeRecord, Transaction};

/// What a commit does to the (identity, symbol) holding record.
#[derive(Clone, Debug, PartialEq)]
pub enum HoldingChange {
    Unchanged,
    Upsert(Holding),
    Remove { user_id: UserId, symbol: Symbol },
}

/// Everything one ledger operation writes. Applied entirely or not at all.
#[derive(Clone, Debug)]
pub struct LedgerCommit {
    pub account: Account,
    pub holding: HoldingChange,
    pub trade: Option<TradeRecord>,
}

impl LedgerCommit {
    pub fn balance_only(account: Account) -> Self {
        LedgerCommit {
            account,
            holding: HoldingChange::Unchanged,
            trade: None,
        }
    }
}

/// Durable account, holding and transaction records. No business logic.
pub trait LedgerStore: Send + Sync {
    /// Insert a new account; fails with `AccountAlreadyExists` if taken.
    fn insert_account(&self, account: &Account) -> Result<()>;

    fn account(&self, user_id: &UserId) -> Result<Option<Account>>;

    fn accounts(&self) -> Result<Vec<Account>>;

    fn holding(&self, user_id: &UserId, symbol: &Symbol) -> Result<Option<Holding>>;

    /// Holdings of one identity ordered by symbol.
    fn holdings(&self, user_id: &UserId) -> Result<Vec<Holding>>;

    /// Every holding in the store, ordered by identity then symbol.
    fn all_holdings(&self) -> Result<Vec<Holding>>;

    /// Transactions of one identity, most recent first.
    fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>>;

    /// Atomically apply the commit. The account must already exist. Returns
    /// the appended transaction when the commit carried a trade.
    fn commit(&self, commit: LedgerCommit) -> Result<Option<Transaction>>;
}
