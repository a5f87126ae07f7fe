use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;
use crate::auth::credentials::CredentialDigest;
use crate::core::locks::{IdentityGuard, IdentityLocks};
use crate::core::receipt::{PositionReport, TradeReceipt};
use crate::error::{Error, Result};
use crate::interfaces::ledger_store::{HoldingChange, LedgerCommit, LedgerStore};
use crate::interfaces::price_oracle::{PriceLookup, PriceOracle};
use crate::observability::metrics::{
    DEPOSITS_APPLIED, OPERATIONS_REJECTED, ORACLE_LOOKUPS_FAILED, TRADE_LATENCY, TRADES_EXECUTED,
};
use crate::observability::tracing::{trace_deposit, trace_trade, trace_valuation};
use crate::risk::pnl::PnLCalculator;
use crate::risk::pre_trade_check::PreTradeCheck;
use crate::settlement::cost_basis::CostBasisCalculator;
use crate::types::account::Account;
use crate::types::balance::Balance;
use crate::types::holding::{Holding, HoldingView};
use crate::types::ids::{OperationId, UserId};
use crate::types::price::Price;
use crate::types::symbol::Symbol;
use crate::types::transaction::{Side, TradeRecord, Transaction};

/// Executes deposits and trades against a [`LedgerStore`], pricing trades
/// through a [`PriceOracle`].
///
/// Mutating operations for one identity are serialized: the identity lock is
/// held from the account read, across the price lookup, until the commit
/// returns. Reads take no lock and see the last committed state.
///
/// Store calls made from async operations run on the blocking pool. The
/// identity guard travels with the commit, so a caller that stops polling
/// cannot release the identity before its write lands.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    oracle: Arc<dyn PriceOracle>,
    locks: IdentityLocks,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, oracle: Arc<dyn PriceOracle>) -> Self {
        LedgerEngine {
            store,
            oracle,
            locks: IdentityLocks::new(),
        }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub async fn open_account(
        &self,
        user_id: &UserId,
        credential: Option<CredentialDigest>,
    ) -> Result<Account> {
        if user_id.is_blank() {
            return Self::rejected("open_account", Error::InvalidIdentity);
        }

        let guard = self.locks.acquire(user_id).await;
        let account = Account::new(user_id.clone(), credential);
        let record = account.clone();
        let inserted = self
            .with_store(move |store| {
                let _guard = guard;
                store.insert_account(&record)
            })
            .await;
        if let Err(e) = inserted {
            return Self::rejected("open_account", e);
        }

        tracing::info!("Account opened: {}", user_id);
        Ok(account)
    }

    pub fn verify_credentials(&self, user_id: &UserId, password: &str) -> Result<()> {
        let account = self.require_account(user_id)?;
        match &account.credential {
            Some(digest) if digest.verify(password) => Ok(()),
            _ => Err(Error::InvalidCredentials),
        }
    }

    pub fn get_balance(&self, user_id: &UserId) -> Result<Balance> {
        Ok(self.require_account(user_id)?.balance)
    }

    pub async fn deposit(&self, user_id: &UserId, amount: Decimal) -> Result<Balance> {
        let operation_id = OperationId::new();
        async {
            let result = self.execute_deposit(user_id, amount).await;
            match &result {
                Ok(balance) => {
                    DEPOSITS_APPLIED.inc();
                    tracing::info!("Deposit of {} applied, new balance {}", amount, balance);
                }
                Err(e) => Self::record_rejection("deposit", e),
            }
            result
        }
        .instrument(trace_deposit(&operation_id, user_id))
        .await
    }

    pub async fn buy(&self, user_id: &UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        let operation_id = OperationId::new();
        async {
            let timer = TRADE_LATENCY.start_timer();
            let result = self.execute_buy(operation_id, user_id, symbol, quantity).await;
            timer.observe_duration();
            Self::record_trade(Side::Buy, &result);
            result
        }
        .instrument(trace_trade(&operation_id, user_id, symbol, Side::Buy))
        .await
    }

    pub async fn sell(&self, user_id: &UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        let operation_id = OperationId::new();
        async {
            let timer = TRADE_LATENCY.start_timer();
            let result = self.execute_sell(operation_id, user_id, symbol, quantity).await;
            timer.observe_duration();
            Self::record_trade(Side::Sell, &result);
            result
        }
        .instrument(trace_trade(&operation_id, user_id, symbol, Side::Sell))
        .await
    }

    pub fn get_holdings(&self, user_id: &UserId) -> Result<BTreeMap<Symbol, HoldingView>> {
        self.require_account(user_id)?;
        Ok(self
            .store
            .holdings(user_id)?
            .into_iter()
            .map(|holding| (holding.symbol.clone(), holding.view()))
            .collect())
    }

    pub fn get_transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        self.require_account(user_id)?;
        self.store.transactions(user_id)
    }

    /// Sum of `quantity × live price` over all holdings. Holdings without a
    /// quote are left out of the total.
    pub async fn portfolio_value(&self, user_id: &UserId) -> Result<Decimal> {
        let report = self.holdings_report(user_id).await?;
        report
            .iter()
            .filter_map(|position| position.market_value)
            .try_fold(Decimal::ZERO, |total, value| {
                total
                    .checked_add(value)
                    .ok_or_else(|| Error::overflow("portfolio value"))
            })
    }

    pub async fn unrealized_pnl(&self, user_id: &UserId, symbol: &str) -> Result<Option<Decimal>> {
        let symbol = Symbol::parse(symbol)?;
        self.load_account(user_id).await?;
        let holding = self
            .load_holding(user_id, &symbol)
            .await?
            .ok_or_else(|| Error::NoSuchHolding { symbol: symbol.clone() })?;

        match self.lookup(&symbol).await {
            Ok(price) => PnLCalculator::unrealized_pnl(&holding, price)
                .map(Some)
                .ok_or_else(|| Error::overflow("unrealized pnl")),
            Err(_) => Ok(None),
        }
    }

    /// Values every holding, quoting distinct symbols concurrently.
    pub async fn holdings_report(&self, user_id: &UserId) -> Result<Vec<PositionReport>> {
        self.value_holdings(user_id)
            .instrument(trace_valuation(user_id))
            .await
    }

    async fn value_holdings(&self, user_id: &UserId) -> Result<Vec<PositionReport>> {
        self.load_account(user_id).await?;
        let owner = user_id.clone();
        let holdings = self.with_store(move |store| store.holdings(&owner)).await?;
        let lookups = join_all(holdings.iter().map(|h| self.lookup(&h.symbol))).await;

        holdings
            .into_iter()
            .zip(lookups)
            .map(|(holding, lookup)| Self::position_report(holding, lookup.ok()))
            .collect()
    }

    async fn execute_deposit(&self, user_id: &UserId, amount: Decimal) -> Result<Balance> {
        let amount = PreTradeCheck::check_amount(amount)?;

        let guard = self.locks.acquire(user_id).await;
        let account = self.load_account(user_id).await?;
        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| Error::overflow("deposit"))?;

        self.commit(guard, LedgerCommit::balance_only(account.with_balance(new_balance)))
            .await?;
        Ok(new_balance)
    }

    async fn execute_buy(
        &self,
        operation_id: OperationId,
        user_id: &UserId,
        symbol: &str,
        quantity: i64,
    ) -> Result<TradeReceipt> {
        let quantity = PreTradeCheck::check_quantity(quantity)?;
        let symbol = Symbol::parse(symbol)?;

        let guard = self.locks.acquire(user_id).await;
        let account = self.load_account(user_id).await?;
        let price = self.quote(&symbol).await?;
        let cost = price
            .notional(quantity)
            .ok_or_else(|| Error::overflow("trade cost"))?;
        PreTradeCheck::check_funds(&account, cost)?;

        let existing = self.load_holding(user_id, &symbol).await?;
        let holding =
            CostBasisCalculator::apply_buy(existing.as_ref(), user_id, &symbol, quantity, price)?;
        let new_balance = account
            .balance
            .checked_sub(cost)
            .ok_or_else(|| Error::overflow("buy settlement"))?;

        let commit = LedgerCommit {
            account: account.with_balance(new_balance),
            holding: HoldingChange::Upsert(holding),
            trade: Some(TradeRecord::new(user_id.clone(), symbol, quantity, price, Side::Buy)),
        };
        let transaction = self.commit_trade(guard, commit).await?;

        Ok(TradeReceipt::new(operation_id, transaction, cost, new_balance))
    }

    async fn execute_sell(
        &self,
        operation_id: OperationId,
        user_id: &UserId,
        symbol: &str,
        quantity: i64,
    ) -> Result<TradeReceipt> {
        let quantity = PreTradeCheck::check_quantity(quantity)?;
        let symbol = Symbol::parse(symbol)?;

        let guard = self.locks.acquire(user_id).await;
        let account = self.load_account(user_id).await?;
        let existing = self.load_holding(user_id, &symbol).await?;
        let holding = PreTradeCheck::check_shares(existing.as_ref(), &symbol, quantity)?;

        // Shares are checked before the oracle is consulted
        let price = self.quote(&symbol).await?;
        let proceeds = price
            .notional(quantity)
            .ok_or_else(|| Error::overflow("trade proceeds"))?;
        let new_balance = account
            .balance
            .checked_add(proceeds)
            .ok_or_else(|| Error::overflow("sell settlement"))?;

        let commit = LedgerCommit {
            account: account.with_balance(new_balance),
            holding: CostBasisCalculator::apply_sell(holding, quantity),
            trade: Some(TradeRecord::new(user_id.clone(), symbol, quantity, price, Side::Sell)),
        };
        let transaction = self.commit_trade(guard, commit).await?;

        Ok(TradeReceipt::new(operation_id, transaction, proceeds, new_balance))
    }

    fn require_account(&self, user_id: &UserId) -> Result<Account> {
        self.store
            .account(user_id)?
            .ok_or_else(|| Error::UnknownAccount(user_id.clone()))
    }

    async fn load_account(&self, user_id: &UserId) -> Result<Account> {
        let owner = user_id.clone();
        self.with_store(move |store| store.account(&owner))
            .await?
            .ok_or_else(|| Error::UnknownAccount(user_id.clone()))
    }

    async fn load_holding(&self, user_id: &UserId, symbol: &Symbol) -> Result<Option<Holding>> {
        let owner = user_id.clone();
        let symbol = symbol.clone();
        self.with_store(move |store| store.holding(&owner, &symbol)).await
    }

    /// Applies the commit, releasing the identity only once the store returns.
    async fn commit(
        &self,
        guard: IdentityGuard,
        commit: LedgerCommit,
    ) -> Result<Option<Transaction>> {
        self.with_store(move |store| {
            let _guard = guard;
            store.commit(commit)
        })
        .await
    }

    async fn commit_trade(&self, guard: IdentityGuard, commit: LedgerCommit) -> Result<Transaction> {
        self.commit(guard, commit)
            .await?
            .ok_or_else(|| Error::StorageFailure("trade was not journaled".to_string()))
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LedgerStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| Error::StorageFailure(format!("store task failed: {}", e)))?
    }

    async fn lookup(&self, symbol: &Symbol) -> PriceLookup {
        let lookup = self.oracle.get_price(symbol).await;
        if let Err(reason) = lookup {
            ORACLE_LOOKUPS_FAILED.with_label_values(&[reason.as_str()]).inc();
            tracing::warn!("Price lookup for {} failed: {}", symbol, reason);
        }
        lookup
    }

    /// A trade never proceeds without a fresh quote.
    async fn quote(&self, symbol: &Symbol) -> Result<Price> {
        self.lookup(symbol).await.map_err(|reason| Error::PriceUnavailable {
            symbol: symbol.clone(),
            reason,
        })
    }

    fn position_report(holding: Holding, price: Option<Price>) -> Result<PositionReport> {
        let (market_value, unrealized_pnl) = match price {
            Some(price) => (
                Some(
                    PnLCalculator::market_value(holding.quantity, price)
                        .ok_or_else(|| Error::overflow("market value"))?,
                ),
                Some(
                    PnLCalculator::unrealized_pnl(&holding, price)
                        .ok_or_else(|| Error::overflow("unrealized pnl"))?,
                ),
            ),
            None => (None, None),
        };

        Ok(PositionReport {
            symbol: holding.symbol,
            quantity: holding.quantity,
            avg_cost_basis: holding.avg_cost_basis,
            current_price: price,
            market_value,
            unrealized_pnl,
        })
    }

    fn record_trade(side: Side, result: &Result<TradeReceipt>) {
        match result {
            Ok(receipt) => {
                TRADES_EXECUTED.with_label_values(&[side.as_str()]).inc();
                tracing::info!(transaction_id = receipt.transaction.id.0, "{}", receipt.message);
            }
            Err(e) => Self::record_rejection(&side.as_str().to_lowercase(), e),
        }
    }

    fn record_rejection(operation: &str, error: &Error) {
        OPERATIONS_REJECTED
            .with_label_values(&[operation, error.kind()])
            .inc();
        match error {
            Error::StorageFailure(_) | Error::Overflow { .. } | Error::InvariantViolation(_) => {
                tracing::error!(kind = error.kind(), "{} failed: {}", operation, error)
            }
            _ => tracing::warn!(kind = error.kind(), "{} rejected: {}", operation, error),
        }
    }

    fn rejected<T>(operation: &str, error: Error) -> Result<T> {
        Self::record_rejection(operation, &error);
        Err(error)
    }
}
