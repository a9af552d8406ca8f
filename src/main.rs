use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use triarb_scanner::catalog::Catalog;
use triarb_scanner::config::ScannerConfig;
use triarb_scanner::market_fetcher::{BybitClient, MarketDataProvider};
use triarb_scanner::scanner::ArbitrageScanner;
use triarb_scanner::telegram::{self, TelegramClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = ScannerConfig::from_env();
    let provider = Arc::new(BybitClient::new());

    info!("loading spot catalog...");
    let pairs = provider.load_catalog().await?;
    info!("loaded {} tradable pairs, building routes...", pairs.len());

    let catalog = Arc::new(Catalog::build(&pairs));
    info!("catalog holds {} triangular routes", catalog.routes().len());

    let telegram = Arc::new(TelegramClient::from_env()?);
    let scanner = ArbitrageScanner::new(catalog, provider, telegram.clone(), config);

    info!("listening for /start and /stop");
    telegram::run_command_loop(&telegram, &scanner).await;
    Ok(())
}
