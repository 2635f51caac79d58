//! Сопоставление выгрузки поставщика с каталогом маркетплейса.
//!
//! Правила общие для всех маркетплейсов:
//! * коды, которых нет в каталоге, пропускаются;
//! * повтор кода в выгрузке игнорируется, даже если первая строка
//!   оказалась некорректной;
//! * товары каталога без строки в выгрузке получают нулевой остаток
//!   (цены для них не отправляются);
//! * строка с некорректным количеством или ценой пропускается с предупреждением.

use super::stock_rules::{normalize_quantity, RuleError};
use contracts::domain::a001_watch_remnant::WatchRemnant;
use std::collections::HashSet;

/// Записи остатков и статистика сопоставления
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockBuild<T> {
    pub records: Vec<T>,
    /// Товары каталога, отправленные с нулём из-за отсутствия в выгрузке
    pub zero_filled: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBuild<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Построить остатки: сначала товары из выгрузки в её порядке,
/// затем обнулённые товары каталога в порядке каталога.
pub fn build_stocks<T, F>(remnants: &[WatchRemnant], offer_ids: &[String], mut make: F) -> StockBuild<T>
where
    F: FnMut(&str, i32) -> T,
{
    let known: HashSet<&str> = offer_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sent: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = 0;

    for remnant in remnants {
        let code = remnant.code.as_str();
        // Код закрепляется за первой строкой, даже если она некорректна
        if !known.contains(code) || !seen.insert(code) {
            continue;
        }
        match normalize_quantity(&remnant.quantity) {
            Ok(quantity) => {
                records.push(make(code, quantity));
                sent.insert(code);
            }
            Err(e) => {
                tracing::warn!("Skipping stock row {}: {}", code, e);
                skipped += 1;
            }
        }
    }

    let mut zero_filled = 0;
    for offer_id in offer_ids {
        if sent.insert(offer_id.as_str()) {
            records.push(make(offer_id, 0));
            zero_filled += 1;
        }
    }

    StockBuild {
        records,
        zero_filled,
        skipped,
    }
}

/// Построить цены для товаров выгрузки, известных каталогу
pub fn build_prices<T, F>(remnants: &[WatchRemnant], offer_ids: &[String], mut make: F) -> PriceBuild<T>
where
    F: FnMut(&str, &str) -> Result<T, RuleError>,
{
    let known: HashSet<&str> = offer_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = 0;

    for remnant in remnants {
        let code = remnant.code.as_str();
        if !known.contains(code) || !seen.insert(code) {
            continue;
        }
        match make(code, &remnant.price) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping price row {}: {}", code, e);
                skipped += 1;
            }
        }
    }

    PriceBuild { records, skipped }
}
