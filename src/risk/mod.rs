pub mod pnl;
pub mod pre_trade_check;
