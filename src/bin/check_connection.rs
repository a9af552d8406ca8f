use dotenv::dotenv;
use triarb_scanner::market_fetcher::{BybitClient, MarketDataProvider};
use triarb_scanner::shared_types::TradingPair;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let client = BybitClient::new();

    println!("Fetching Bybit spot catalog...");
    let pairs = client.load_catalog().await?;
    println!("✅ {} tradable spot pairs.", pairs.len());

    let probe = pairs
        .iter()
        .find(|p| p.base == "BTC" && p.quote == "USDT")
        .cloned()
        .unwrap_or_else(|| TradingPair::new("BTC", "USDT"));
    println!("Fetching {} order book...", probe);

    let book = client.fetch_order_book(&probe).await;
    println!(
        "✅ Book holds {} bid / {} ask levels.",
        book.bids.len(),
        book.asks.len()
    );
    if let (Some(bid), Some(ask)) = (book.bids.first(), book.asks.first()) {
        println!("✅ Best bid {} / best ask {}", bid.price, ask.price);
    } else {
        println!("⚠️ Book came back empty. Check connectivity.");
    }

    Ok(())
}
