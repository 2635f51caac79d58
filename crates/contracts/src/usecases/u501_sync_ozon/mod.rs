pub mod records;

pub use records::{OzonPrice, OzonStock};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncOzon;

impl UseCaseMetadata for SyncOzon {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "sync_ozon"
    }

    fn display_name() -> &'static str {
        "Синхронизация остатков и цен Ozon"
    }
}
