use std::sync::Arc;
use crate::config::store::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::interfaces::ledger_store::LedgerStore;

pub mod cost_basis;
pub mod memory;
pub mod sqlite;

pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn LedgerStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory ledger store");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        StoreBackend::Sqlite => Ok(Arc::new(sqlite::SqliteStore::open(config.sqlite_path.clone())?)),
    }
}
