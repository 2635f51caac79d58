pub mod records;

pub use records::{YandexPrice, YandexPriceValue, YandexStock, YandexStockItem};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncYandex;

impl UseCaseMetadata for SyncYandex {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "sync_yandex"
    }

    fn display_name() -> &'static str {
        "Синхронизация остатков и цен Яндекс Маркета"
    }
}
