use super::ozon_api_client::{OzonImportResult, OzonSellerApi};
use crate::shared::batching::{batch_count, divide};
use crate::shared::config::MarketplaceSettings;
use crate::shared::record_builder::{build_prices, build_stocks};
use crate::shared::stock_rules::{price_conversion, RuleError};
use anyhow::Result;
use contracts::domain::a001_watch_remnant::WatchRemnant;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::{StockUpload, SyncSummary, UseCaseMetadata};
use contracts::usecases::u501_sync_ozon::{OzonPrice, OzonStock, SyncOzon};
use std::sync::Arc;

/// Executor для UseCase синхронизации Ozon
pub struct SyncExecutor {
    api_client: Arc<dyn OzonSellerApi>,
    settings: MarketplaceSettings,
}

impl SyncExecutor {
    pub fn new(api_client: Arc<dyn OzonSellerApi>, settings: MarketplaceSettings) -> Self {
        Self {
            api_client,
            settings,
        }
    }

    /// Выполнить синхронизацию: каталог, остатки, цены
    pub async fn run(&self, remnants: &[WatchRemnant]) -> Result<SyncSummary> {
        tracing::info!(
            "Starting {} ({})",
            SyncOzon::full_name(),
            SyncOzon::display_name()
        );
        let mut summary = SyncSummary::new(MarketplaceType::Ozon, "Ozon");

        let offer_ids = self.get_offer_ids().await?;
        summary.catalog_offers = offer_ids.len();

        self.upload_stocks(remnants, &offer_ids, &mut summary).await?;
        self.upload_prices(remnants, &offer_ids, &mut summary).await?;

        tracing::info!("{} completed", SyncOzon::display_name());
        Ok(summary)
    }

    /// Получить артикулы всех товаров продавца.
    ///
    /// Пагинация по `last_id`, пока число полученных товаров не сравняется с `total`.
    pub async fn get_offer_ids(&self) -> Result<Vec<String>> {
        let mut last_id = String::new();
        let mut offer_ids: Vec<String> = Vec::new();

        loop {
            let page = self
                .api_client
                .fetch_product_list(&last_id, self.settings.page_limit)
                .await?;

            let received = page.items.len();
            let total = page.total.max(0) as usize;
            offer_ids.extend(page.items.into_iter().map(|item| item.offer_id));
            tracing::info!(
                "Ozon product list page: {} items, {} of {} collected",
                received,
                offer_ids.len(),
                total
            );

            if offer_ids.len() >= total {
                break;
            }
            if received == 0 {
                tracing::warn!(
                    "Ozon returned an empty page before reaching total ({} of {}), stopping pagination",
                    offer_ids.len(),
                    total
                );
                break;
            }
            last_id = page.last_id;
        }

        Ok(offer_ids)
    }

    /// Построить остатки и отправить пачками. Возвращает все записи и ненулевые из них.
    pub async fn upload_stocks(
        &self,
        remnants: &[WatchRemnant],
        offer_ids: &[String],
        summary: &mut SyncSummary,
    ) -> Result<StockUpload<OzonStock>> {
        let build = build_stocks(remnants, offer_ids, |offer_id, stock| OzonStock::new(offer_id, stock));
        summary.zero_filled = build.zero_filled;
        summary.skipped_rows += build.skipped;

        let size = self.settings.stock_batch_size;
        let batches = batch_count(build.records.len(), size);
        for (index, batch) in divide(&build.records, size)?.enumerate() {
            tracing::info!(
                "Sending Ozon stocks batch {}/{} ({} items)",
                index + 1,
                batches,
                batch.len()
            );
            let results = self.api_client.update_stocks(batch).await?;
            report_rejected("stocks", &results);
            summary.stock_batches += 1;
        }

        let upload = StockUpload::from_records(build.records);
        summary.stock_records = upload.all.len();
        summary.non_empty_stocks = upload.non_empty.len();
        Ok(upload)
    }

    /// Построить цены и отправить пачками. Возвращает отправленные цены.
    pub async fn upload_prices(
        &self,
        remnants: &[WatchRemnant],
        offer_ids: &[String],
        summary: &mut SyncSummary,
    ) -> Result<Vec<OzonPrice>> {
        let build = build_prices(remnants, offer_ids, |offer_id, raw| {
            let price = price_conversion(raw);
            if price.is_empty() {
                return Err(RuleError::EmptyPrice(raw.to_string()));
            }
            Ok(OzonPrice::new(offer_id, price))
        });
        summary.skipped_rows += build.skipped;

        let size = self.settings.price_batch_size;
        let batches = batch_count(build.records.len(), size);
        for (index, batch) in divide(&build.records, size)?.enumerate() {
            tracing::info!(
                "Sending Ozon prices batch {}/{} ({} items)",
                index + 1,
                batches,
                batch.len()
            );
            let results = self.api_client.update_prices(batch).await?;
            report_rejected("prices", &results);
            summary.price_batches += 1;
        }

        summary.price_records = build.records.len();
        Ok(build.records)
    }
}

/// Товары, которые Ozon не принял, только логируются
fn report_rejected(kind: &str, results: &[OzonImportResult]) {
    let rejected: Vec<&OzonImportResult> = results.iter().filter(|r| r.is_rejected()).collect();
    if rejected.is_empty() {
        return;
    }
    tracing::warn!("Ozon rejected {} of {} {} updates", rejected.len(), results.len(), kind);
    for result in rejected {
        tracing::warn!("  {}: {:?}", result.offer_id, result.errors);
    }
}
