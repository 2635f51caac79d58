//! Common types and traits for all UseCases

pub mod stock_upload;
pub mod sync_summary;
pub mod usecase_metadata;

// Re-exports
pub use stock_upload::{StockRecord, StockUpload};
pub use sync_summary::SyncSummary;
pub use usecase_metadata::UseCaseMetadata;
