use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyClass {
    Stable,
    Base,
    Alt,
}

/// One triangular cycle: stable -> A (leg1), A -> B (leg2), B -> stable (leg3).
/// `leg2_inverted` is true when leg2 is quoted as B/A rather than A/B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub leg1: TradingPair,
    pub leg2: TradingPair,
    pub leg3: TradingPair,
    pub leg2_inverted: bool,
}

impl Route {
    /// The coin bought with the stable on leg1.
    pub fn coin_a(&self) -> &str {
        &self.leg1.base
    }

    /// The other coin of leg2, resolved through the inversion flag.
    pub fn coin_b(&self) -> &str {
        if self.leg2_inverted {
            &self.leg2.base
        } else {
            &self.leg2.quote
        }
    }

    /// The stable hub the cycle starts and ends in.
    pub fn stable(&self) -> &str {
        &self.leg1.quote
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} → {}", self.leg1, self.leg2, self.leg3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}

/// Point-in-time view of one book: asks ascending, bids descending by price.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub fetched_at: DateTime<Utc>,
}

impl OrderBookSnapshot {
    pub fn new(bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        Self {
            bids,
            asks,
            fetched_at: Utc::now(),
        }
    }

    /// The provider contract maps fetch failures onto this.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_one_sided(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillResult {
    pub average_price: Decimal,
    pub filled_notional: Decimal,
}

/// A qualifying route for one scan pass. Discarded after emission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub route: Route,
    pub profit: Decimal,
    pub profit_percent: Decimal,
    pub liquidity: Decimal,
}
