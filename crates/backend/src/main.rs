pub mod shared;
pub mod usecases;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::SyncSummary;
use shared::config::{load_config, Credentials};
use shared::errors::user_message;
use shared::format::format_summary;
use shared::stock_feed::StockFeedClient;
use std::process::ExitCode;
use std::sync::Arc;
use usecases::{u501_sync_ozon, u502_sync_yandex};

/// Синхронизация остатков и цен часов с маркетплейсами
#[derive(Debug, Parser)]
#[command(name = "stock_sync", version)]
struct Cli {
    /// Какие маркетплейсы синхронизировать
    #[arg(long, short, value_enum, default_value_t = Target::All, env = "SYNC_MARKETPLACE")]
    marketplace: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Ozon,
    Yandex,
    All,
}

impl Target {
    fn marketplaces(self) -> Vec<MarketplaceType> {
        match self {
            Target::Ozon => vec![MarketplaceType::Ozon],
            Target::Yandex => vec![MarketplaceType::YandexMarket],
            Target::All => MarketplaceType::all(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env в рабочем каталоге необязателен
    let _ = dotenv::dotenv();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize file logging: {:#}", e);
    }

    let cli = Cli::parse();

    match run(cli.marketplace).await {
        Ok(summaries) => {
            for summary in &summaries {
                tracing::info!("{}", format_summary(summary));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Sync failed: {:#}", e);
            eprintln!("{}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = || {
        tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into()),
        )
    };

    let log_dir = shared::logger::log_dir();
    let log_file = std::fs::create_dir_all(&log_dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("stock_sync.log"))
    });

    match log_file {
        Ok(log_file) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(log_file))
                        .with_ansi(false),
                )
                .init();
            Ok(())
        }
        Err(e) => {
            // Без файла пишем только в консоль
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .init();
            Err(e).context(format!("cannot open log file in {}", log_dir.display()))
        }
    }
}

/// Скачать выгрузку один раз и синхронизировать выбранные маркетплейсы по очереди
async fn run(target: Target) -> anyhow::Result<Vec<SyncSummary>> {
    let marketplaces = target.marketplaces();
    let config = load_config()?;
    let credentials = Credentials::from_env(&marketplaces)?;

    let feed = StockFeedClient::new(config.stock_feed.clone())?;
    let remnants = feed.download_stock().await?;
    // Пустая выгрузка обнулила бы весь каталог
    if remnants.is_empty() {
        anyhow::bail!("Stock feed contains no products, nothing was sent");
    }

    let mut summaries = Vec::new();

    if let Some(ozon) = credentials.ozon {
        let client = u501_sync_ozon::OzonApiClient::new(&config.ozon, ozon)?;
        let executor = u501_sync_ozon::SyncExecutor::new(Arc::new(client), config.ozon.clone());
        summaries.push(executor.run(&remnants).await?);
    }

    if let Some(yandex) = credentials.yandex {
        let client = u502_sync_yandex::YandexApiClient::new(&config.yandex, yandex.access_token)?;
        let executor =
            u502_sync_yandex::SyncExecutor::new(Arc::new(client), config.yandex.clone());
        summaries.extend(executor.run(&remnants, &yandex.campaigns, Utc::now()).await?);
    }

    Ok(summaries)
}
