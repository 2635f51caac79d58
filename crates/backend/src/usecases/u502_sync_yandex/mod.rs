pub mod executor;
pub mod yandex_api_client;

pub use executor::SyncExecutor;
pub use yandex_api_client::YandexApiClient;
