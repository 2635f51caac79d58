use crate::shared::config::{MarketplaceSettings, OzonCredentials};
use crate::shared::logger::{append_api_log, preview};
use anyhow::{Context, Result};
use async_trait::async_trait;
use contracts::usecases::u501_sync_ozon::{OzonPrice, OzonStock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const API_LOG: &str = "ozon_api_requests.log";

/// Операции Ozon Seller API, нужные для синхронизации
#[async_trait]
pub trait OzonSellerApi: Send + Sync {
    /// Страница каталога начиная с `last_id` (пустая строка для первой страницы)
    async fn fetch_product_list(&self, last_id: &str, limit: i32) -> Result<OzonProductListResult>;

    async fn update_stocks(&self, stocks: &[OzonStock]) -> Result<Vec<OzonImportResult>>;

    async fn update_prices(&self, prices: &[OzonPrice]) -> Result<Vec<OzonImportResult>>;
}

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: OzonCredentials,
}

impl OzonApiClient {
    pub fn new(settings: &MarketplaceSettings, credentials: OzonCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// POST с JSON-телом и заголовками Client-Id / Api-Key
    async fn post<B, T>(&self, path: &str, request_body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::to_string(request_body)?;
        append_api_log(
            API_LOG,
            &format!(
                "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
                url,
                self.credentials.client_id,
                preview(&body, 2000)
            ),
        );

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.credentials.client_id)
            .header("Api-Key", &self.credentials.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("OZON API request to {} failed", path))?;

        let status = response.status();
        append_api_log(API_LOG, &format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            append_api_log(API_LOG, &format!("ERROR Response body:\n{}", body));
            tracing::error!("OZON API request failed: {}", body);
            anyhow::bail!("OZON API request failed with status {}: {}", status, body);
        }

        let body = response.text().await?;
        append_api_log(API_LOG, &format!("=== RESPONSE BODY ===\n{}\n", body));
        tracing::debug!("OZON API response preview: {}", preview(&body, 500));

        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse OZON API response. Error: {}", e);
            anyhow::anyhow!(
                "Failed to parse OZON API JSON: {}. Response: {}",
                e,
                preview(&body, 500)
            )
        })
    }
}

#[async_trait]
impl OzonSellerApi for OzonApiClient {
    /// POST /v3/product/list
    async fn fetch_product_list(&self, last_id: &str, limit: i32) -> Result<OzonProductListResult> {
        let request_body = OzonProductListRequest {
            filter: OzonProductListFilter {
                visibility: "ALL".to_string(),
            },
            last_id: last_id.to_string(),
            limit,
        };
        let response: OzonProductListResponse =
            self.post("/v3/product/list", &request_body).await?;
        Ok(response.result)
    }

    /// POST /v1/product/import/stocks
    async fn update_stocks(&self, stocks: &[OzonStock]) -> Result<Vec<OzonImportResult>> {
        let response: OzonImportResponse = self
            .post("/v1/product/import/stocks", &OzonStocksRequest { stocks })
            .await?;
        Ok(response.result)
    }

    /// POST /v1/product/import/prices
    async fn update_prices(&self, prices: &[OzonPrice]) -> Result<Vec<OzonImportResult>> {
        let response: OzonImportResponse = self
            .post("/v1/product/import/prices", &OzonPricesRequest { prices })
            .await?;
        Ok(response.result)
    }
}

// ============================================================================
// Request/Response structures для OZON API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListRequest {
    pub filter: OzonProductListFilter,
    pub last_id: String,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListFilter {
    pub visibility: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OzonProductListResult {
    #[serde(default)]
    pub items: Vec<OzonProductListItem>,
    pub total: i32,
    #[serde(default)]
    pub last_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListItem {
    pub offer_id: String,
}

#[derive(Debug, Serialize)]
pub struct OzonStocksRequest<'a> {
    pub stocks: &'a [OzonStock],
}

#[derive(Debug, Serialize)]
pub struct OzonPricesRequest<'a> {
    pub prices: &'a [OzonPrice],
}

/// Ответ методов импорта остатков и цен
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResponse {
    #[serde(default)]
    pub result: Vec<OzonImportResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResult {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>, // code + message, структура зависит от метода
}

impl OzonImportResult {
    pub fn is_rejected(&self) -> bool {
        !self.updated || !self.errors.is_empty()
    }
}
