pub mod aggregate;

pub use aggregate::{FeedColumns, FeedRow, WatchRemnant};
