pub mod alpha_vantage;
pub mod static_feed;
