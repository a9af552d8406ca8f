use crate::shared_types::{BookLevel, OrderBookSnapshot, TradingPair};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use tracing::warn;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.bybit.com";
const BOOK_DEPTH_LIMIT: u32 = 50;

/// Market-data collaborator. `load_catalog` failures are fatal at startup;
/// `fetch_order_book` never fails: transient problems surface as an empty
/// snapshot, which the evaluator already treats as "no liquidity".
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn load_catalog(
        &self,
    ) -> Result<Vec<TradingPair>, Box<dyn std::error::Error + Send + Sync>>;

    async fn fetch_order_book(&self, pair: &TradingPair) -> OrderBookSnapshot;
}

#[derive(Deserialize, Debug)]
struct ApiEnvelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Deserialize, Debug)]
struct ApiInstrumentList {
    #[serde(default)]
    list: Vec<ApiInstrument>,
}

#[derive(Deserialize, Debug)]
struct ApiInstrument {
    #[serde(rename = "baseCoin")]
    base_coin: String,
    #[serde(rename = "quoteCoin")]
    quote_coin: String,
    status: String,
}

#[derive(Deserialize, Debug)]
struct ApiOrderBook {
    // Bybit ships bids under "b" (descending) and asks under "a" (ascending),
    // both as [price, size] string tuples.
    #[serde(default)]
    b: Vec<[String; 2]>,
    #[serde(default)]
    a: Vec<[String; 2]>,
}

pub struct BybitClient {
    http: reqwest::Client,
    base_url: String,
}

impl BybitClient {
    pub fn new() -> Self {
        let base_url = env::var("BYBIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.base_url, path))
    }

    /// Bybit spot symbols are the bare concatenation of base and quote.
    fn symbol_for(pair: &TradingPair) -> String {
        format!("{}{}", pair.base, pair.quote)
    }

    async fn try_fetch_order_book(
        &self,
        pair: &TradingPair,
    ) -> Result<OrderBookSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        let url = self.endpoint("/v5/market/orderbook")?;
        let envelope: ApiEnvelope<ApiOrderBook> = self
            .http
            .get(url)
            .query(&[
                ("category", "spot".to_string()),
                ("symbol", Self::symbol_for(pair)),
                ("limit", BOOK_DEPTH_LIMIT.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if envelope.ret_code != 0 {
            return Err(format!("orderbook retCode {}: {}", envelope.ret_code, envelope.ret_msg).into());
        }
        let book = envelope.result.ok_or("orderbook response missing result")?;

        Ok(OrderBookSnapshot::new(
            parse_levels(&book.b),
            parse_levels(&book.a),
        ))
    }
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for BybitClient {
    async fn load_catalog(
        &self,
    ) -> Result<Vec<TradingPair>, Box<dyn std::error::Error + Send + Sync>> {
        let url = self.endpoint("/v5/market/instruments-info")?;
        let envelope: ApiEnvelope<ApiInstrumentList> = self
            .http
            .get(url)
            .query(&[("category", "spot")])
            .send()
            .await?
            .json()
            .await?;

        if envelope.ret_code != 0 {
            return Err(
                format!("instruments retCode {}: {}", envelope.ret_code, envelope.ret_msg).into(),
            );
        }

        let pairs = envelope
            .result
            .map(|r| r.list)
            .unwrap_or_default()
            .into_iter()
            .filter(|i| i.status == "Trading" && i.base_coin != i.quote_coin)
            .map(|i| TradingPair::new(&i.base_coin, &i.quote_coin))
            .collect();

        Ok(pairs)
    }

    async fn fetch_order_book(&self, pair: &TradingPair) -> OrderBookSnapshot {
        match self.try_fetch_order_book(pair).await {
            Ok(book) => book,
            Err(e) => {
                warn!("order book fetch for {} failed: {}", pair, e);
                OrderBookSnapshot::empty()
            }
        }
    }
}

fn parse_levels(raw: &[[String; 2]]) -> Vec<BookLevel> {
    raw.iter()
        .filter_map(|[price, size]| {
            let price = Decimal::from_str(price).ok()?;
            let size = Decimal::from_str(size).ok()?;
            (price > Decimal::ZERO && size > Decimal::ZERO).then(|| BookLevel::new(price, size))
        })
        .collect()
}
