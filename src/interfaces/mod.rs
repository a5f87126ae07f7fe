pub mod ledger_store;
pub mod price_oracle;
