use rust_decimal::Decimal;
use std::collections::HashSet;
use crate::error::{Error, InvariantViolation, Result};
use crate::interfaces::ledger_store::LedgerStore;
use crate::types::ids::UserId;

pub struct InvariantChecks;

impl InvariantChecks {
    /// Check no negative balances
    pub fn check_no_negative_balances(store: &dyn LedgerStore) -> Result<()> {
        for account in store.accounts()? {
            if account.balance.is_negative() {
                return Err(Error::InvariantViolation(InvariantViolation {
                    invariant: "no_negative_balances",
                    details: format!(
                        "Account {} has negative balance: {}",
                        account.user_id, account.balance
                    ),
                }));
            }
        }
        Ok(())
    }

    /// Every holding belongs to a known account and carries a non-negative average
    pub fn check_holdings_consistent(store: &dyn LedgerStore) -> Result<()> {
        let accounts = store.accounts()?;
        let known: HashSet<&UserId> = accounts.iter().map(|a| &a.user_id).collect();

        for holding in store.all_holdings()? {
            if !known.contains(&holding.user_id) {
                return Err(Error::InvariantViolation(InvariantViolation {
                    invariant: "holding_has_account",
                    details: format!(
                        "Holding {} belongs to unknown account {}",
                        holding.symbol, holding.user_id
                    ),
                }));
            }
            if holding.avg_cost_basis < Decimal::ZERO {
                return Err(Error::InvariantViolation(InvariantViolation {
                    invariant: "non_negative_cost_basis",
                    details: format!(
                        "Holding {} of {} has cost basis {}",
                        holding.symbol, holding.user_id, holding.avg_cost_basis
                    ),
                }));
            }
        }
        Ok(())
    }

    pub fn check_all(store: &dyn LedgerStore) -> Result<()> {
        Self::check_no_negative_balances(store)?;
        Self::check_holdings_consistent(store)?;
        Ok(())
    }
}
