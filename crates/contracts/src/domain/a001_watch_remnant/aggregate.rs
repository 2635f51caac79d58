use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Строка выгрузки остатков: имя колонки → текст ячейки
pub type FeedRow = HashMap<String, String>;

/// Имена колонок выгрузки, из которых собирается остаток
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedColumns {
    pub code: String,
    pub quantity: String,
    pub price: String,
}

impl Default for FeedColumns {
    fn default() -> Self {
        Self {
            code: "Код".to_string(),
            quantity: "Количество".to_string(),
            price: "Цена".to_string(),
        }
    }
}

/// Остаток часов из выгрузки поставщика.
///
/// Значения хранятся в исходном текстовом виде: количество может быть
/// `">10"`, цена может содержать пробелы, копейки и обозначение валюты.
/// Нормализация выполняется при построении записей для маркетплейса.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRemnant {
    /// Код товара (совпадает с артикулом продавца на маркетплейсе)
    pub code: String,
    pub quantity: String,
    pub price: String,
}

impl WatchRemnant {
    pub fn new(
        code: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    /// Собрать остаток из строки выгрузки. Строки без кода пропускаются.
    pub fn from_row(row: &FeedRow, columns: &FeedColumns) -> Option<Self> {
        let code = row.get(&columns.code).map(|c| c.trim()).unwrap_or_default();
        if code.is_empty() {
            return None;
        }

        let field = |name: &str| row.get(name).cloned().unwrap_or_default();
        Some(Self {
            code: code.to_string(),
            quantity: field(&columns.quantity),
            price: field(&columns.price),
        })
    }
}
