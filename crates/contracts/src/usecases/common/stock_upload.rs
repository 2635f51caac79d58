use serde::{Deserialize, Serialize};

/// Запись остатка, отправляемая на маркетплейс
pub trait StockRecord {
    /// Отправляемое количество
    fn quantity(&self) -> i32;

    fn is_empty(&self) -> bool {
        self.quantity() == 0
    }
}

/// Результат выгрузки остатков: все отправленные записи и ненулевые из них
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpload<T> {
    pub non_empty: Vec<T>,
    pub all: Vec<T>,
}

impl<T: StockRecord + Clone> StockUpload<T> {
    pub fn from_records(all: Vec<T>) -> Self {
        let non_empty = all.iter().filter(|s| !s.is_empty()).cloned().collect();
        Self { non_empty, all }
    }
}
