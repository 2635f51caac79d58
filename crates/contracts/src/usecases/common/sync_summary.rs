use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};

/// Итоги синхронизации одной цели (магазина или кампании)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub marketplace: MarketplaceType,
    /// Метка цели, например "Ozon" или "FBS 21000001"
    pub target: String,
    /// Количество товаров в каталоге маркетплейса
    pub catalog_offers: usize,
    pub stock_records: usize,
    pub non_empty_stocks: usize,
    /// Товары каталога, которых нет в выгрузке (отправлены с нулевым остатком)
    pub zero_filled: usize,
    pub price_records: usize,
    pub stock_batches: usize,
    pub price_batches: usize,
    /// Строки выгрузки, пропущенные из-за некорректного количества или цены
    pub skipped_rows: usize,
}

impl SyncSummary {
    pub fn new(marketplace: MarketplaceType, target: impl Into<String>) -> Self {
        Self {
            marketplace,
            target: target.into(),
            catalog_offers: 0,
            stock_records: 0,
            non_empty_stocks: 0,
            zero_filled: 0,
            price_records: 0,
            stock_batches: 0,
            price_batches: 0,
            skipped_rows: 0,
        }
    }
}
