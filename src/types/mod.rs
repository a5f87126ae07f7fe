pub mod account;
pub mod balance;
pub mod holding;
pub mod ids;
pub mod price;
pub mod quantity;
pub mod symbol;
pub mod timestamp;
pub mod transaction;
