pub mod u501_sync_ozon;
pub mod u502_sync_yandex;
