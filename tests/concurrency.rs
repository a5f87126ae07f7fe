use async_trait::async_trait;
use portfolio_ledger::core::engine::LedgerEngine;
use portfolio_ledger::error::Error;
use portfolio_ledger::interfaces::price_oracle::{PriceLookup, PriceOracle};
use portfolio_ledger::settlement::memory::MemoryStore;
use portfolio_ledger::settlement::sqlite::SqliteStore;
use portfolio_ledger::types::balance::Balance;
use portfolio_ledger::types::ids::UserId;
use portfolio_ledger::types::price::Price;
use portfolio_ledger::types::symbol::Symbol;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Notify;

/// Quotes every symbol at 60.00 after a short delay, so concurrent trades
/// overlap inside the oracle call.
struct SlowOracle;

#[async_trait]
impl PriceOracle for SlowOracle {
    async fn get_price(&self, _symbol: &Symbol) -> PriceLookup {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(Price::new(dec!(60)).unwrap())
    }
}

/// Blocks lookups for `HOLD` until released; everything else quotes at once.
struct GatedOracle {
    release: Arc<Notify>,
}

#[async_trait]
impl PriceOracle for GatedOracle {
    async fn get_price(&self, symbol: &Symbol) -> PriceLookup {
        if symbol.as_str() == "HOLD" {
            self.release.notified().await;
        }
        Ok(Price::new(dec!(10)).unwrap())
    }
}

async fn open_funded(engine: &LedgerEngine, name: &str) -> UserId {
    let user_id = UserId::from(name);
    engine.open_account(&user_id, None).await.unwrap();
    engine.deposit(&user_id, dec!(100)).await.unwrap();
    user_id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn jointly_unaffordable_buys_settle_at_most_once() {
    let engine = Arc::new(LedgerEngine::new(Arc::new(MemoryStore::new()), Arc::new(SlowOracle)));
    let alice = open_funded(&engine, "alice").await;

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let alice = alice.clone();
            tokio::spawn(async move { engine.buy(&alice, "AAPL", 1).await })
        })
        .collect();

    let mut succeeded = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(Error::InsufficientFunds { .. }) => insufficient += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!((succeeded, insufficient), (1, 1));
    assert_eq!(engine.get_balance(&alice).unwrap(), Balance::from_decimal(dec!(40)));
    assert_eq!(engine.get_transactions(&alice).unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_deposits_all_land() {
    let engine = Arc::new(LedgerEngine::new(Arc::new(MemoryStore::new()), Arc::new(SlowOracle)));
    let alice = UserId::from("alice");
    engine.open_account(&alice, None).await.unwrap();

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let alice = alice.clone();
            tokio::spawn(async move { engine.deposit(&alice, dec!(0.01)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(engine.get_balance(&alice).unwrap(), Balance::from_decimal(dec!(0.50)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiting_on_the_oracle_does_not_block_other_identities() {
    let release = Arc::new(Notify::new());
    let oracle = GatedOracle { release: Arc::clone(&release) };
    let engine = Arc::new(LedgerEngine::new(Arc::new(MemoryStore::new()), Arc::new(oracle)));
    let alice = open_funded(&engine, "alice").await;
    let bob = open_funded(&engine, "bob").await;

    let stalled = {
        let engine = Arc::clone(&engine);
        let alice = alice.clone();
        tokio::spawn(async move { engine.buy(&alice, "HOLD", 1).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let bob_trade = tokio::time::timeout(Duration::from_secs(2), engine.buy(&bob, "AAPL", 2)).await;
    assert!(bob_trade.expect("bob was blocked by alice").is_ok());

    // Alice's identity is still locked while her lookup is pending
    let alice_deposit =
        tokio::time::timeout(Duration::from_millis(50), engine.deposit(&alice, dec!(1))).await;
    assert!(alice_deposit.is_err());

    release.notify_one();
    let receipt = stalled.await.unwrap().unwrap();
    assert_eq!(receipt.new_balance, Balance::from_decimal(dec!(90)));
    assert_eq!(engine.get_balance(&bob).unwrap(), Balance::from_decimal(dec!(80)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_backed_trades_settle_across_identities() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("ledger.db")).unwrap();
    let engine = Arc::new(LedgerEngine::new(Arc::new(store), Arc::new(SlowOracle)));

    let mut users = Vec::new();
    for name in ["alice", "bob", "carol"] {
        let user_id = UserId::from(name);
        engine.open_account(&user_id, None).await.unwrap();
        engine.deposit(&user_id, dec!(1000)).await.unwrap();
        users.push(user_id);
    }

    let tasks: Vec<_> = users
        .iter()
        .flat_map(|user_id| std::iter::repeat(user_id.clone()).take(10))
        .map(|user_id| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.buy(&user_id, "AAPL", 1).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for user_id in &users {
        assert_eq!(engine.get_balance(user_id).unwrap(), Balance::from_decimal(dec!(400)));
        let holdings = engine.get_holdings(user_id).unwrap();
        assert_eq!(holdings[&Symbol::parse("AAPL").unwrap()].quantity, 10);
        assert_eq!(engine.get_transactions(user_id).unwrap().len(), 10);
    }
}
