pub mod executor;
pub mod ozon_api_client;

pub use executor::SyncExecutor;
pub use ozon_api_client::OzonApiClient;
