use serde::{Deserialize, Serialize};
use std::fmt;

/// Типы маркетплейсов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketplaceType {
    Ozon,
    YandexMarket,
}

impl MarketplaceType {
    /// Получить код маркетплейса
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "mp-ozon",
            MarketplaceType::YandexMarket => "mp-ym",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "Ozon",
            MarketplaceType::YandexMarket => "Яндекс Маркет",
        }
    }

    /// Получить все типы маркетплейсов в порядке синхронизации
    pub fn all() -> Vec<MarketplaceType> {
        vec![MarketplaceType::Ozon, MarketplaceType::YandexMarket]
    }
}

impl fmt::Display for MarketplaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
