use crate::usecases::common::StockRecord;
use serde::{Deserialize, Serialize};

/// Элемент запроса PUT /campaigns/{campaignId}/offers/stocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YandexStock {
    pub sku: String,
    #[serde(rename = "warehouseId")]
    pub warehouse_id: i64,
    pub items: Vec<YandexStockItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YandexStockItem {
    pub count: i32,
    /// Всегда "FIT" (годный товар)
    #[serde(rename = "type")]
    pub stock_type: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl YandexStock {
    pub fn fit(
        sku: impl Into<String>,
        warehouse_id: i64,
        count: i32,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            warehouse_id,
            items: vec![YandexStockItem {
                count,
                stock_type: "FIT".to_string(),
                updated_at: updated_at.into(),
            }],
        }
    }
}

impl StockRecord for YandexStock {
    /// Количество берётся из первого элемента `items`
    fn quantity(&self) -> i32 {
        self.items.first().map(|i| i.count).unwrap_or(0)
    }
}

/// Элемент запроса POST /campaigns/{campaignId}/offer-prices/updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YandexPrice {
    pub id: String,
    pub price: YandexPriceValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YandexPriceValue {
    pub value: i64,
    #[serde(rename = "currencyId")]
    pub currency_id: String,
}

impl YandexPrice {
    pub const CURRENCY: &'static str = "RUR";

    pub fn new(id: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            price: YandexPriceValue {
                value,
                currency_id: Self::CURRENCY.to_string(),
            },
        }
    }
}
