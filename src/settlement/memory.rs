use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use crate::error::{Error, Result};
use crate::interfaces::ledger_store::{HoldingChange, LedgerCommit, LedgerStore};
use crate::types::account::Account;
use crate::types::holding::Holding;
use crate::types::ids::{TransactionId, UserId};
use crate::types::symbol::Symbol;
use crate::types::transaction::{sort_most_recent_first, Transaction};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<UserId, Account>,
    holdings: BTreeMap<(UserId, Symbol), Holding>,
    transactions: Vec<Transaction>,
    last_transaction_id: u64,
}

/// Process-local store. A commit validates and applies under one write guard,
/// so readers observe either none or all of it.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl LedgerStore for MemoryStore {
    fn insert_account(&self, account: &Account) -> Result<()> {
        let mut state = self.state.write();
        if state.accounts.contains_key(&account.user_id) {
            return Err(Error::AccountAlreadyExists(account.user_id.clone()));
        }
        state.accounts.insert(account.user_id.clone(), account.clone());
        Ok(())
    }

    fn account(&self, user_id: &UserId) -> Result<Option<Account>> {
        Ok(self.state.read().accounts.get(user_id).cloned())
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        let state = self.state.read();
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(accounts)
    }

    fn holding(&self, user_id: &UserId, symbol: &Symbol) -> Result<Option<Holding>> {
        let key = (user_id.clone(), symbol.clone());
        Ok(self.state.read().holdings.get(&key).cloned())
    }

    fn holdings(&self, user_id: &UserId) -> Result<Vec<Holding>> {
        Ok(self
            .state
            .read()
            .holdings
            .values()
            .filter(|h| &h.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all_holdings(&self) -> Result<Vec<Holding>> {
        Ok(self.state.read().holdings.values().cloned().collect())
    }

    fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .state
            .read()
            .transactions
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        sort_most_recent_first(&mut transactions);
        Ok(transactions)
    }

    fn commit(&self, commit: LedgerCommit) -> Result<Option<Transaction>> {
        let mut state = self.state.write();

        // Validate everything before touching any map
        let user_id = commit.account.user_id.clone();
        if !state.accounts.contains_key(&user_id) {
            return Err(Error::StorageFailure(format!("account {} does not exist", user_id)));
        }
        match &commit.holding {
            HoldingChange::Upsert(holding) if holding.user_id != user_id => {
                return Err(Error::StorageFailure(format!(
                    "holding for {} committed with account {}",
                    holding.user_id, user_id
                )));
            }
            HoldingChange::Remove { user_id: owner, .. } if *owner != user_id => {
                return Err(Error::StorageFailure(format!(
                    "holding removal for {} committed with account {}",
                    owner, user_id
                )));
            }
            _ => {}
        }

        state.accounts.insert(user_id, commit.account);

        match commit.holding {
            HoldingChange::Unchanged => {}
            HoldingChange::Upsert(holding) => {
                state
                    .holdings
                    .insert((holding.user_id.clone(), holding.symbol.clone()), holding);
            }
            HoldingChange::Remove { user_id, symbol } => {
                state.holdings.remove(&(user_id, symbol));
            }
        }

        let transaction = commit.trade.map(|trade| {
            state.last_transaction_id += 1;
            let transaction = trade.into_transaction(TransactionId(state.last_transaction_id));
            state.transactions.push(transaction.clone());
            transaction
        });

        Ok(transaction)
    }
}
