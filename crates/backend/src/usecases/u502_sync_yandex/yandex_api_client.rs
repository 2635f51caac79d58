use crate::shared::config::MarketplaceSettings;
use crate::shared::logger::{append_api_log, preview};
use anyhow::{Context, Result};
use async_trait::async_trait;
use contracts::usecases::u502_sync_yandex::{YandexPrice, YandexStock};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const API_LOG: &str = "yandex_api_requests.log";

/// Начало токена страницы для логов (по символам, не по байтам)
pub fn token_preview(token: &str) -> String {
    token.chars().take(50).collect()
}

/// Операции Yandex Market Partner API, нужные для синхронизации
#[async_trait]
pub trait YandexPartnerApi: Send + Sync {
    /// Страница соответствий товаров кампании; `page_token` пуст для первой страницы
    async fn fetch_product_list(
        &self,
        campaign_id: &str,
        page_token: Option<&str>,
        limit: i32,
    ) -> Result<YandexOfferMappingResult>;

    async fn update_stocks(&self, campaign_id: &str, skus: &[YandexStock]) -> Result<()>;

    async fn update_prices(&self, campaign_id: &str, offers: &[YandexPrice]) -> Result<()>;
}

/// HTTP-клиент для работы с Yandex Market API
pub struct YandexApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl YandexApiClient {
    pub fn new(settings: &MarketplaceSettings, access_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Выполнить запрос с Bearer-токеном и разобрать JSON-ответ
    async fn send<T>(&self, request: reqwest::RequestBuilder, description: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let response = request
            .header("Authorization", format!("Bearer {}", &self.access_token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Yandex Market API request failed: {}", description))?;

        let status = response.status();
        append_api_log(API_LOG, &format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            append_api_log(API_LOG, &format!("ERROR Response body:\n{}", body));
            tracing::error!("Yandex Market API request failed: {}", body);
            anyhow::bail!(
                "Yandex Market API request failed with status {}: {}",
                status,
                body
            );
        }

        let body = response.text().await?;
        append_api_log(API_LOG, &format!("=== RESPONSE BODY ===\n{}\n", body));
        tracing::debug!("Yandex Market API response preview: {}", preview(&body, 500));

        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse Yandex Market API response. Error: {}", e);
            anyhow::anyhow!(
                "Failed to parse Yandex Market API JSON: {}. Response: {}",
                e,
                preview(&body, 500)
            )
        })
    }

    /// Запрос на запись с JSON-телом; ответ должен иметь статус OK
    async fn write<B>(&self, method: Method, url: String, request_body: &B) -> Result<()>
    where
        B: Serialize + Sync,
    {
        let body = serde_json::to_string(request_body)?;
        append_api_log(
            API_LOG,
            &format!(
                "=== REQUEST ===\n{} {}\nAuthorization: Bearer ****\nBody: {}",
                method,
                url,
                preview(&body, 2000)
            ),
        );

        let description = format!("{} {}", method, url);
        let request = self.client.request(method, &url).body(body);
        let response: YandexStatusResponse = self.send(request, &description).await?;
        if !response.is_ok() {
            tracing::warn!(
                "Yandex Market API answered {} with status {:?}: {:?}",
                description,
                response.status,
                response.errors
            );
        }
        Ok(())
    }
}

#[async_trait]
impl YandexPartnerApi for YandexApiClient {
    /// GET /campaigns/{campaignId}/offer-mapping-entries
    async fn fetch_product_list(
        &self,
        campaign_id: &str,
        page_token: Option<&str>,
        limit: i32,
    ) -> Result<YandexOfferMappingResult> {
        let url = format!(
            "{}/campaigns/{}/offer-mapping-entries",
            self.base_url, campaign_id
        );

        #[derive(Serialize)]
        struct YandexListQueryParams<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            page_token: Option<&'a str>,
            limit: i32,
        }

        let query = YandexListQueryParams { page_token, limit };
        append_api_log(
            API_LOG,
            &format!(
                "=== REQUEST ===\nGET {}\nAuthorization: Bearer ****\nQuery: limit={}, page_token={:?}",
                url,
                limit,
                page_token.map(token_preview)
            ),
        );

        let request = self.client.get(&url).query(&query);
        let response: YandexOfferMappingResponse =
            self.send(request, &format!("GET {}", url)).await?;
        Ok(response.result)
    }

    /// PUT /campaigns/{campaignId}/offers/stocks
    async fn update_stocks(&self, campaign_id: &str, skus: &[YandexStock]) -> Result<()> {
        let url = format!("{}/campaigns/{}/offers/stocks", self.base_url, campaign_id);
        self.write(Method::PUT, url, &YandexStocksRequest { skus })
            .await
    }

    /// POST /campaigns/{campaignId}/offer-prices/updates
    async fn update_prices(&self, campaign_id: &str, offers: &[YandexPrice]) -> Result<()> {
        let url = format!(
            "{}/campaigns/{}/offer-prices/updates",
            self.base_url, campaign_id
        );
        self.write(Method::POST, url, &YandexPricesRequest { offers })
            .await
    }
}

// ============================================================================
// Request/Response structures для Yandex Market API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingResponse {
    pub result: YandexOfferMappingResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YandexOfferMappingResult {
    #[serde(default)]
    pub paging: YandexPaging,
    #[serde(rename = "offerMappingEntries", default)]
    pub offer_mapping_entries: Vec<YandexOfferMappingEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YandexPaging {
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntry {
    pub offer: YandexOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOffer {
    #[serde(rename = "shopSku")]
    pub shop_sku: String,
}

#[derive(Debug, Serialize)]
pub struct YandexStocksRequest<'a> {
    pub skus: &'a [YandexStock],
}

#[derive(Debug, Serialize)]
pub struct YandexPricesRequest<'a> {
    pub offers: &'a [YandexPrice],
}

/// Ответ методов записи: {"status": "OK"} или {"status": "ERROR", "errors": [...]}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl YandexStatusResponse {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "OK") && self.errors.is_empty()
    }
}
