use thiserror::Error;

/// Остаток, который поставщик пишет как ">10"
const PLENTY: &str = ">10";
const PLENTY_QUANTITY: i32 = 100;

/// Единственный экземпляр на складе поставщика не выставляем
const LAST_ITEM: &str = "1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("quantity {0:?} is not a number")]
    InvalidQuantity(String),

    #[error("price {0:?} has no digits")]
    EmptyPrice(String),

    #[error("price {0:?} is too large")]
    PriceOutOfRange(String),
}

/// Перевести количество из выгрузки в остаток для маркетплейса
///
/// # Примеры
/// ```ignore
/// assert_eq!(normalize_quantity(">10"), Ok(100));
/// assert_eq!(normalize_quantity("1"), Ok(0));
/// assert_eq!(normalize_quantity("7"), Ok(7));
/// ```
pub fn normalize_quantity(raw: &str) -> Result<i32, RuleError> {
    match raw.trim() {
        PLENTY => Ok(PLENTY_QUANTITY),
        LAST_ITEM => Ok(0),
        other => other
            .parse::<i32>()
            .map_err(|_| RuleError::InvalidQuantity(raw.to_string())),
    }
}

/// Оставить в цене только цифры целой части.
///
/// Копейки отбрасываются по первой точке, затем удаляются пробелы,
/// разделители разрядов и обозначение валюты: `"5 990.00 руб."` → `"5990"`.
pub fn price_conversion(price: &str) -> String {
    price
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// Цена как целое число; пустая строка цифр считается ошибкой
pub fn price_value(price: &str) -> Result<i64, RuleError> {
    let digits = price_conversion(price);
    if digits.is_empty() {
        return Err(RuleError::EmptyPrice(price.to_string()));
    }
    digits
        .parse::<i64>()
        .map_err(|_| RuleError::PriceOutOfRange(price.to_string()))
}
