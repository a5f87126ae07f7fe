use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Transaction as SqlTransaction};
use rust_decimal::Decimal;

use crate::auth::credentials::CredentialDigest;
use crate::error::{Error, Result};
use crate::interfaces::ledger_store::{HoldingChange, LedgerCommit, LedgerStore};
use crate::types::account::Account;
use crate::types::balance::Balance;
use crate::types::holding::Holding;
use crate::types::ids::{TransactionId, UserId};
use crate::types::price::Price;
use crate::types::quantity::Quantity;
use crate::types::symbol::Symbol;
use crate::types::timestamp::Timestamp;
use crate::types::transaction::{Side, Transaction};

const LEDGER_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    user_id TEXT PRIMARY KEY,
    balance TEXT NOT NULL,
    credential TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS holdings (
    user_id TEXT NOT NULL REFERENCES accounts(user_id),
    symbol TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    avg_cost_basis TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, symbol)
);
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES accounts(user_id),
    symbol TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    price TEXT NOT NULL,
    side TEXT NOT NULL CHECK (side IN ('BUY', 'SELL')),
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS transactions_idx_user_timestamp
    ON transactions(user_id, timestamp);
"#;

/// SQLite-backed store. Every commit runs inside one SQL transaction; an
/// early return drops it uncommitted, which rolls it back.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = SqliteStore { path: path.into() };
        store.initialize_schema()?;
        tracing::info!("Opened SQLite ledger store at {}", store.path.display());
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(LEDGER_SCHEMA)?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;",
        )?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }
}

impl LedgerStore for SqliteStore {
    fn insert_account(&self, account: &Account) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM accounts WHERE user_id = ?1",
                params![account.user_id.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(Error::AccountAlreadyExists(account.user_id.clone()));
        }
        tx.execute(
            "INSERT INTO accounts (user_id, balance, credential, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.user_id.as_str(),
                account.balance.to_decimal().to_string(),
                account.credential.as_ref().map(|c| c.as_str().to_string()),
                account.created_at.to_rfc3339(),
                account.updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn account(&self, user_id: &UserId) -> Result<Option<Account>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, balance, credential, created_at, updated_at
             FROM accounts WHERE user_id = ?1",
        )?;
        let mut rows = stmt.query(params![user_id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_account(row)?)),
            None => Ok(None),
        }
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, balance, credential, created_at, updated_at
             FROM accounts ORDER BY user_id ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(row_to_account(row)?);
        }
        Ok(accounts)
    }

    fn holding(&self, user_id: &UserId, symbol: &Symbol) -> Result<Option<Holding>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, symbol, quantity, avg_cost_basis, updated_at
             FROM holdings WHERE user_id = ?1 AND symbol = ?2",
        )?;
        let mut rows = stmt.query(params![user_id.as_str(), symbol.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_holding(row)?)),
            None => Ok(None),
        }
    }

    fn holdings(&self, user_id: &UserId) -> Result<Vec<Holding>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, symbol, quantity, avg_cost_basis, updated_at
             FROM holdings WHERE user_id = ?1 ORDER BY symbol ASC",
        )?;
        let mut rows = stmt.query(params![user_id.as_str()])?;
        let mut holdings = Vec::new();
        while let Some(row) = rows.next()? {
            holdings.push(row_to_holding(row)?);
        }
        Ok(holdings)
    }

    fn all_holdings(&self) -> Result<Vec<Holding>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, symbol, quantity, avg_cost_basis, updated_at
             FROM holdings ORDER BY user_id ASC, symbol ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut holdings = Vec::new();
        while let Some(row) = rows.next()? {
            holdings.push(row_to_holding(row)?);
        }
        Ok(holdings)
    }

    fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, symbol, quantity, price, side, timestamp
             FROM transactions WHERE user_id = ?1
             ORDER BY timestamp DESC, id DESC",
        )?;
        let mut rows = stmt.query(params![user_id.as_str()])?;
        let mut transactions = Vec::new();
        while let Some(row) = rows.next()? {
            transactions.push(row_to_transaction(row)?);
        }
        Ok(transactions)
    }

    fn commit(&self, commit: LedgerCommit) -> Result<Option<Transaction>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let account = &commit.account;
        let updated = tx.execute(
            "UPDATE accounts SET balance = ?1, updated_at = ?2 WHERE user_id = ?3",
            params![
                account.balance.to_decimal().to_string(),
                account.updated_at.to_rfc3339(),
                account.user_id.as_str(),
            ],
        )?;
        if updated != 1 {
            return Err(Error::StorageFailure(format!(
                "account {} does not exist",
                account.user_id
            )));
        }

        apply_holding_change(&tx, &commit.holding)?;

        let transaction = match commit.trade {
            Some(trade) => {
                tx.execute(
                    "INSERT INTO transactions (user_id, symbol, quantity, price, side, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        trade.user_id.as_str(),
                        trade.symbol.as_str(),
                        to_sql_quantity(trade.quantity)?,
                        trade.price.to_decimal().to_string(),
                        trade.side.as_str(),
                        trade.timestamp.to_rfc3339(),
                    ],
                )?;
                let id = TransactionId(tx.last_insert_rowid() as u64);
                Some(trade.into_transaction(id))
            }
            None => None,
        };

        tx.commit()?;
        Ok(transaction)
    }
}

fn apply_holding_change(tx: &SqlTransaction<'_>, change: &HoldingChange) -> Result<()> {
    match change {
        HoldingChange::Unchanged => {}
        HoldingChange::Upsert(holding) => {
            tx.execute(
                "INSERT INTO holdings (user_id, symbol, quantity, avg_cost_basis, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, symbol) DO UPDATE SET
                    quantity = excluded.quantity,
                    avg_cost_basis = excluded.avg_cost_basis,
                    updated_at = excluded.updated_at",
                params![
                    holding.user_id.as_str(),
                    holding.symbol.as_str(),
                    to_sql_quantity(holding.quantity)?,
                    holding.avg_cost_basis.to_string(),
                    holding.updated_at.to_rfc3339(),
                ],
            )?;
        }
        HoldingChange::Remove { user_id, symbol } => {
            tx.execute(
                "DELETE FROM holdings WHERE user_id = ?1 AND symbol = ?2",
                params![user_id.as_str(), symbol.as_str()],
            )?;
        }
    }
    Ok(())
}

fn to_sql_quantity(quantity: Quantity) -> Result<i64> {
    i64::try_from(quantity.to_u64())
        .map_err(|_| Error::StorageFailure(format!("quantity {quantity} exceeds storage range")))
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|err| Error::StorageFailure(format!("invalid decimal {raw}: {err}")))
}

fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    Timestamp::parse_rfc3339(raw)
        .ok_or_else(|| Error::StorageFailure(format!("invalid timestamp {raw}")))
}

fn parse_symbol(raw: &str) -> Result<Symbol> {
    Symbol::parse(raw).map_err(|err| Error::StorageFailure(format!("invalid stored symbol: {err}")))
}

fn parse_quantity(raw: i64) -> Result<Quantity> {
    Quantity::from_i64(raw)
        .ok_or_else(|| Error::StorageFailure(format!("invalid stored quantity {raw}")))
}

fn row_to_account(row: &rusqlite::Row<'_>) -> Result<Account> {
    let user_id: String = row.get(0)?;
    let balance: String = row.get(1)?;
    let credential: Option<String> = row.get(2)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Account {
        user_id: UserId::new(user_id),
        balance: Balance::from_decimal(parse_decimal(&balance)?),
        credential: credential.map(CredentialDigest::from_stored),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_holding(row: &rusqlite::Row<'_>) -> Result<Holding> {
    let user_id: String = row.get(0)?;
    let symbol: String = row.get(1)?;
    let quantity: i64 = row.get(2)?;
    let avg_cost_basis: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Holding {
        user_id: UserId::new(user_id),
        symbol: parse_symbol(&symbol)?,
        quantity: parse_quantity(quantity)?,
        avg_cost_basis: parse_decimal(&avg_cost_basis)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_transaction(row: &rusqlite::Row<'_>) -> Result<Transaction> {
    let id: i64 = row.get(0)?;
    let user_id: String = row.get(1)?;
    let symbol: String = row.get(2)?;
    let quantity: i64 = row.get(3)?;
    let price: String = row.get(4)?;
    let side: String = row.get(5)?;
    let timestamp: String = row.get(6)?;

    let price = Price::new(parse_decimal(&price)?)
        .ok_or_else(|| Error::StorageFailure(format!("non-positive stored price {price}")))?;
    let side = Side::from_str(&side).map_err(Error::StorageFailure)?;

    Ok(Transaction {
        id: TransactionId(id as u64),
        user_id: UserId::new(user_id),
        symbol: parse_symbol(&symbol)?,
        quantity: parse_quantity(quantity)?,
        price,
        side,
        timestamp: parse_timestamp(&timestamp)?,
    })
}
