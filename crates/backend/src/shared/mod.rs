pub mod batching;
pub mod config;
pub mod errors;
pub mod format;
pub mod logger;
pub mod record_builder;
pub mod stock_feed;
pub mod stock_rules;
