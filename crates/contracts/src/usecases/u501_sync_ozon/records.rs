use crate::usecases::common::StockRecord;
use serde::{Deserialize, Serialize};

/// Элемент запроса POST /v1/product/import/stocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OzonStock {
    pub offer_id: String,
    pub stock: i32,
}

impl OzonStock {
    pub fn new(offer_id: impl Into<String>, stock: i32) -> Self {
        Self {
            offer_id: offer_id.into(),
            stock,
        }
    }
}

impl StockRecord for OzonStock {
    fn quantity(&self) -> i32 {
        self.stock
    }
}

/// Элемент запроса POST /v1/product/import/prices
///
/// Ozon принимает цены строками; `old_price` = "0" снимает зачёркнутую цену.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OzonPrice {
    pub auto_action_enabled: String,
    pub currency_code: String,
    pub offer_id: String,
    pub old_price: String,
    pub price: String,
}

impl OzonPrice {
    pub const CURRENCY: &'static str = "RUB";

    pub fn new(offer_id: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            auto_action_enabled: "UNKNOWN".to_string(),
            currency_code: Self::CURRENCY.to_string(),
            offer_id: offer_id.into(),
            old_price: "0".to_string(),
            price: price.into(),
        }
    }
}
