use contracts::usecases::common::SyncSummary;

/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```ignore
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Строка итогов синхронизации для лога
pub fn format_summary(summary: &SyncSummary) -> String {
    format!(
        "{} [{}]: каталог {}, остатки {} (ненулевые {}, обнулены {}) в {} пач., цены {} в {} пач., пропущено строк {}",
        summary.marketplace.display_name(),
        summary.target,
        format_number(summary.catalog_offers),
        format_number(summary.stock_records),
        format_number(summary.non_empty_stocks),
        format_number(summary.zero_filled),
        summary.stock_batches,
        format_number(summary.price_records),
        summary.price_batches,
        summary.skipped_rows,
    )
}
