use super::yandex_api_client::{token_preview, YandexPartnerApi};
use crate::shared::batching::{batch_count, divide};
use crate::shared::config::{MarketplaceSettings, YandexCampaign};
use crate::shared::record_builder::{build_prices, build_stocks};
use crate::shared::stock_rules::price_value;
use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::domain::a001_watch_remnant::WatchRemnant;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::{StockUpload, SyncSummary, UseCaseMetadata};
use contracts::usecases::u502_sync_yandex::{SyncYandex, YandexPrice, YandexStock};
use std::sync::Arc;

/// Отметка времени остатков: UTC с точностью до секунды, суффикс Z
pub fn stock_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Executor для UseCase синхронизации Яндекс Маркета
pub struct SyncExecutor {
    api_client: Arc<dyn YandexPartnerApi>,
    settings: MarketplaceSettings,
}

impl SyncExecutor {
    pub fn new(api_client: Arc<dyn YandexPartnerApi>, settings: MarketplaceSettings) -> Self {
        Self {
            api_client,
            settings,
        }
    }

    /// Синхронизировать кампании по очереди. Все остатки запуска получают
    /// одну и ту же отметку времени `now`.
    pub async fn run(
        &self,
        remnants: &[WatchRemnant],
        campaigns: &[YandexCampaign],
        now: DateTime<Utc>,
    ) -> Result<Vec<SyncSummary>> {
        tracing::info!(
            "Starting {} ({})",
            SyncYandex::full_name(),
            SyncYandex::display_name()
        );
        let updated_at = stock_timestamp(now);

        let mut summaries = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            summaries.push(self.run_campaign(remnants, campaign, &updated_at).await?);
        }

        tracing::info!("{} completed", SyncYandex::display_name());
        Ok(summaries)
    }

    async fn run_campaign(
        &self,
        remnants: &[WatchRemnant],
        campaign: &YandexCampaign,
        updated_at: &str,
    ) -> Result<SyncSummary> {
        tracing::info!(
            "Syncing Yandex Market {} campaign {}",
            campaign.label,
            campaign.campaign_id
        );
        let mut summary = SyncSummary::new(
            MarketplaceType::YandexMarket,
            format!("{} {}", campaign.label, campaign.campaign_id),
        );

        let offer_ids = self.get_offer_ids(&campaign.campaign_id).await?;
        summary.catalog_offers = offer_ids.len();

        self.upload_stocks(remnants, &offer_ids, campaign, updated_at, &mut summary)
            .await?;
        self.upload_prices(remnants, &offer_ids, &campaign.campaign_id, &mut summary)
            .await?;

        Ok(summary)
    }

    /// Получить shopSku всех товаров кампании.
    ///
    /// Пагинация по `nextPageToken`, пока API его возвращает.
    pub async fn get_offer_ids(&self, campaign_id: &str) -> Result<Vec<String>> {
        let mut page_token: Option<String> = None;
        let mut offer_ids: Vec<String> = Vec::new();

        loop {
            let page = self
                .api_client
                .fetch_product_list(campaign_id, page_token.as_deref(), self.settings.page_limit)
                .await?;

            let received = page.offer_mapping_entries.len();
            offer_ids.extend(
                page.offer_mapping_entries
                    .into_iter()
                    .map(|entry| entry.offer.shop_sku),
            );
            tracing::info!(
                "Yandex Market offer page: {} items, {} collected",
                received,
                offer_ids.len()
            );

            let next_page_token = page.paging.next_page_token.filter(|t| !t.is_empty());
            let Some(next_page_token) = next_page_token else {
                tracing::info!("No next_page_token, stopping pagination");
                break;
            };

            // Защита от зацикливания: если токен не изменился, прекращаем
            if page_token.as_deref() == Some(next_page_token.as_str()) {
                tracing::warn!(
                    "Page token did not change, stopping to prevent infinite loop. Token: {:?}",
                    token_preview(&next_page_token)
                );
                break;
            }
            page_token = Some(next_page_token);
        }

        Ok(offer_ids)
    }

    /// Построить остатки для склада кампании и отправить пачками
    pub async fn upload_stocks(
        &self,
        remnants: &[WatchRemnant],
        offer_ids: &[String],
        campaign: &YandexCampaign,
        updated_at: &str,
        summary: &mut SyncSummary,
    ) -> Result<StockUpload<YandexStock>> {
        let build = build_stocks(remnants, offer_ids, |sku, count| {
            YandexStock::fit(sku, campaign.warehouse_id, count, updated_at)
        });
        summary.zero_filled = build.zero_filled;
        summary.skipped_rows += build.skipped;

        let size = self.settings.stock_batch_size;
        let batches = batch_count(build.records.len(), size);
        for (index, batch) in divide(&build.records, size)?.enumerate() {
            tracing::info!(
                "Sending Yandex Market stocks batch {}/{} ({} items) to campaign {}",
                index + 1,
                batches,
                batch.len(),
                campaign.campaign_id
            );
            self.api_client
                .update_stocks(&campaign.campaign_id, batch)
                .await?;
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
        campaign_id: &str,
        summary: &mut SyncSummary,
    ) -> Result<Vec<YandexPrice>> {
        let build = build_prices(remnants, offer_ids, |id, raw| {
            Ok(YandexPrice::new(id, price_value(raw)?))
        });
        summary.skipped_rows += build.skipped;

        let size = self.settings.price_batch_size;
        let batches = batch_count(build.records.len(), size);
        for (index, batch) in divide(&build.records, size)?.enumerate() {
            tracing::info!(
                "Sending Yandex Market prices batch {}/{} ({} items) to campaign {}",
                index + 1,
                batches,
                batch.len(),
                campaign_id
            );
            self.api_client.update_prices(campaign_id, batch).await?;
            summary.price_batches += 1;
        }

        summary.price_records = build.records.len();
        Ok(build.records)
    }
}
