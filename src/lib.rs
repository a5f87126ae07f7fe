pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod interfaces;
pub mod invariants;
pub mod observability;
pub mod price_infra;
pub mod risk;
pub mod settlement;
pub mod types;
