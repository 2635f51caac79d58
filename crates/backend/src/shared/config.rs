use contracts::domain::a001_watch_remnant::FeedColumns;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;
use thiserror::Error;

/// Ошибки конфигурации. Любая из них фатальна при старте.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} must be an integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },

    #[error("{section}.{key} must be greater than zero")]
    ZeroBatchSize {
        section: &'static str,
        key: &'static str,
    },

    #[error("invalid config.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read config.toml: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub stock_feed: StockFeedSettings,
    pub ozon: MarketplaceSettings,
    pub yandex: MarketplaceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockFeedSettings {
    pub url: String,
    /// Имя файла таблицы внутри архива
    pub file_name: String,
    /// Номер строки заголовка (с нуля, от начала листа)
    pub header_row: u32,
    pub code_column: String,
    pub quantity_column: String,
    pub price_column: String,
    pub timeout_secs: u64,
}

impl StockFeedSettings {
    pub fn columns(&self) -> FeedColumns {
        FeedColumns {
            code: self.code_column.clone(),
            quantity: self.quantity_column.clone(),
            price: self.price_column.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketplaceSettings {
    pub base_url: String,
    pub page_limit: i32,
    pub stock_batch_size: usize,
    pub price_batch_size: usize,
    pub timeout_secs: u64,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[stock_feed]
url = "https://timeworld.ru/upload/files/ostatki.zip"
file_name = "ostatki.xls"
header_row = 17
code_column = "Код"
quantity_column = "Количество"
price_column = "Цена"
timeout_secs = 60

[ozon]
base_url = "https://api-seller.ozon.ru"
page_limit = 1000
stock_batch_size = 100
# Старый сценарий отправлял цены пачками по 900
price_batch_size = 1000
timeout_secs = 30

[yandex]
base_url = "https://api.partner.market.yandex.ru"
page_limit = 200
stock_batch_size = 2000
price_batch_size = 500
timeout_secs = 30
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> Result<Config, ConfigError> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::debug!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents)?;
    for (section, settings) in [("ozon", &config.ozon), ("yandex", &config.yandex)] {
        if settings.stock_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize {
                section,
                key: "stock_batch_size",
            });
        }
        if settings.price_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize {
                section,
                key: "price_batch_size",
            });
        }
    }
    Ok(config)
}

// ============================================================================
// Credentials (environment)
// ============================================================================

/// Доступ к Ozon Seller API
#[derive(Debug, Clone)]
pub struct OzonCredentials {
    pub client_id: String,
    pub api_key: String,
}

/// Кампания Яндекс Маркета со своим складом
#[derive(Debug, Clone)]
pub struct YandexCampaign {
    /// "FBS" или "DBS"
    pub label: &'static str,
    pub campaign_id: String,
    pub warehouse_id: i64,
}

/// Доступ к Yandex Market Partner API
#[derive(Debug, Clone)]
pub struct YandexCredentials {
    pub access_token: String,
    /// FBS, затем DBS
    pub campaigns: Vec<YandexCampaign>,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub ozon: Option<OzonCredentials>,
    pub yandex: Option<YandexCredentials>,
}

impl Credentials {
    /// Прочитать переменные окружения для выбранных маркетплейсов
    pub fn from_env(targets: &[MarketplaceType]) -> Result<Self, ConfigError> {
        Self::from_lookup(targets, |name| std::env::var(name).ok())
    }

    /// Пустое значение считается отсутствующим
    pub fn from_lookup<F>(targets: &[MarketplaceType], lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let require_int = |name: &'static str| -> Result<i64, ConfigError> {
            let value = require(name)?;
            value
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidInteger { name, value })
        };

        let mut credentials = Credentials::default();

        if targets.contains(&MarketplaceType::Ozon) {
            credentials.ozon = Some(OzonCredentials {
                api_key: require("SELLER_TOKEN")?,
                client_id: require("CLIENT_ID")?,
            });
        }

        if targets.contains(&MarketplaceType::YandexMarket) {
            credentials.yandex = Some(YandexCredentials {
                access_token: require("MARKET_TOKEN")?,
                campaigns: vec![
                    YandexCampaign {
                        label: "FBS",
                        campaign_id: require("FBS_ID")?,
                        warehouse_id: require_int("WAREHOUSE_FBS_ID")?,
                    },
                    YandexCampaign {
                        label: "DBS",
                        campaign_id: require("DBS_ID")?,
                        warehouse_id: require_int("WAREHOUSE_DBS_ID")?,
                    },
                ],
            });
        }

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use std::collections::HashMap;

    fn lookup(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |name| vars.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.stock_feed.header_row, 17);
        assert_eq!(config.stock_feed.file_name, "ostatki.xls");
        assert_eq!(config.ozon.stock_batch_size, 100);
        assert_eq!(config.ozon.price_batch_size, 1000);
        assert_eq!(config.yandex.stock_batch_size, 2000);
        assert_eq!(config.yandex.price_batch_size, 500);
        assert_eq!(config.yandex.page_limit, 200);
        assert_eq!(config.stock_feed.columns(), FeedColumns::default());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let contents = DEFAULT_CONFIG.replace("stock_batch_size = 2000", "stock_batch_size = 0");
        let err = parse_config(&contents).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroBatchSize {
                section: "yandex",
                key: "stock_batch_size"
            }
        ));
    }

    #[test]
    fn reads_only_selected_marketplaces() {
        let vars = hashmap! {
            "SELLER_TOKEN" => "secret",
            "CLIENT_ID" => "12345",
        };
        let creds = Credentials::from_lookup(&[MarketplaceType::Ozon], lookup(vars)).unwrap();
        let ozon = creds.ozon.unwrap();
        assert_eq!(ozon.client_id, "12345");
        assert_eq!(ozon.api_key, "secret");
        assert!(creds.yandex.is_none());
    }

    #[test]
    fn yandex_campaigns_are_fbs_then_dbs() {
        let vars = hashmap! {
            "MARKET_TOKEN" => "token",
            "FBS_ID" => "21000001",
            "DBS_ID" => "21000002",
            "WAREHOUSE_FBS_ID" => "501",
            "WAREHOUSE_DBS_ID" => " 502 ",
        };
        let creds =
            Credentials::from_lookup(&[MarketplaceType::YandexMarket], lookup(vars)).unwrap();
        let yandex = creds.yandex.unwrap();
        let labels: Vec<_> = yandex.campaigns.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["FBS", "DBS"]);
        assert_eq!(yandex.campaigns[1].warehouse_id, 502);
    }

    #[test]
    fn missing_or_empty_variable_is_fatal() {
        let vars = hashmap! {
            "SELLER_TOKEN" => "secret",
            "CLIENT_ID" => "   ",
        };
        let err = Credentials::from_lookup(&[MarketplaceType::Ozon], lookup(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("CLIENT_ID")));
    }

    #[test]
    fn warehouse_id_must_be_integer() {
        let vars = hashmap! {
            "MARKET_TOKEN" => "token",
            "FBS_ID" => "1",
            "DBS_ID" => "2",
            "WAREHOUSE_FBS_ID" => "main",
            "WAREHOUSE_DBS_ID" => "3",
        };
        let err = Credentials::from_lookup(&[MarketplaceType::YandexMarket], lookup(vars))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidInteger { name: "WAREHOUSE_FBS_ID", .. }
        ));
    }
}
