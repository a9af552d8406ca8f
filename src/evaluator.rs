use crate::catalog::Catalog;
use crate::config::ScannerConfig;
use crate::depth::{simulate_fill, top_of_book_notional};
use crate::market_fetcher::MarketDataProvider;
use crate::shared_types::{CurrencyClass, OrderBookSnapshot, Route, ScanResult};
use futures::future;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fetches the three leg books (independently, assembled before any math
/// runs) and evaluates the route. One book fetch per leg per evaluation;
/// nothing is reused across legs or routes.
pub async fn evaluate(
    route: &Route,
    catalog: &Catalog,
    provider: &dyn MarketDataProvider,
    config: &ScannerConfig,
) -> Option<ScanResult> {
    let (book1, book2, book3) = future::join3(
        provider.fetch_order_book(&route.leg1),
        provider.fetch_order_book(&route.leg2),
        provider.fetch_order_book(&route.leg3),
    )
    .await;

    evaluate_route(route, catalog, &book1, &book2, &book3, config)
}

/// Walks one triangular cycle through three book snapshots and prices it at
/// the configured notional. `None` is the normal outcome (no liquidity, no
/// edge, or an out-of-band result), not an error.
pub fn evaluate_route(
    route: &Route,
    catalog: &Catalog,
    book1: &OrderBookSnapshot,
    book2: &OrderBookSnapshot,
    book3: &OrderBookSnapshot,
    config: &ScannerConfig,
) -> Option<ScanResult> {
    let fee_keep = Decimal::ONE - config.fee_rate;
    let class_a = catalog.class_of(route.coin_a());
    let class_b = catalog.class_of(route.coin_b());

    // Leg 1: spend the stable notional into coin A against the asks.
    let fill1 = simulate_fill(&book1.asks, config.trade_notional)?;
    let amount_a = config.trade_notional / fill1.average_price * fee_keep;
    let liquidity1 = top_of_book_notional(&book1.asks);

    // Leg 2: swap A into B. The consumed side depends on which coin, if
    // either, is classified stable. Route construction keeps both coins
    // non-stable, but classification data can drift; branch anyway.
    if book2.is_one_sided() {
        return None;
    }
    let (amount_b, liquidity2) = if class_a == CurrencyClass::Stable {
        let fill2 = simulate_fill(&book2.asks, amount_a)?;
        let amount = if route.leg2_inverted {
            amount_a / fill2.average_price
        } else {
            amount_a * fill2.average_price
        };
        (amount * fee_keep, top_of_book_notional(&book2.asks))
    } else if class_b == CurrencyClass::Stable {
        let fill2 = simulate_fill(&book2.bids, amount_a)?;
        let amount = if route.leg2_inverted {
            amount_a * fill2.average_price
        } else {
            amount_a / fill2.average_price
        };
        (amount * fee_keep, top_of_book_notional(&book2.bids))
    } else {
        let fill2 = simulate_fill(&book2.asks, amount_a)?;
        let amount = if route.leg2_inverted {
            amount_a / fill2.average_price
        } else {
            amount_a * fill2.average_price
        };
        (amount * fee_keep, top_of_book_notional(&book2.asks))
    };

    // Leg 3: close B back into the stable against the bids.
    let fill3 = simulate_fill(&book3.bids, amount_b)?;
    let final_amount = amount_b * fill3.average_price * fee_keep;
    let liquidity3 = top_of_book_notional(&book3.bids);

    let liquidity = liquidity1.min(liquidity2).min(liquidity3);
    if liquidity < config.min_liquidity || liquidity > config.max_liquidity {
        return None;
    }

    // A cycle returning over 10x the notional means stale or corrupt books.
    if final_amount <= Decimal::ZERO || final_amount > config.trade_notional * dec!(10) {
        return None;
    }

    let profit = final_amount - config.trade_notional;
    let profit_percent = profit / config.trade_notional * dec!(100);
    if profit_percent < config.min_profit_percent {
        return None;
    }

    Some(ScanResult {
        route: route.clone(),
        profit,
        profit_percent,
        liquidity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::{BookLevel, TradingPair};
    use rust_decimal_macros::dec;

    fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> OrderBookSnapshot {
        let levels = |specs: &[(Decimal, Decimal)]| {
            specs
                .iter()
                .map(|&(price, size)| BookLevel::new(price, size))
                .collect()
        };
        OrderBookSnapshot::new(levels(bids), levels(asks))
    }

    fn catalog_of(specs: &[(&str, &str)]) -> Catalog {
        let pairs: Vec<TradingPair> =
            specs.iter().map(|(b, q)| TradingPair::new(b, q)).collect();
        Catalog::build(&pairs)
    }

    /// BTC -> ETH over an inverted ETH/BTC connecting pair.
    fn base_coin_setup() -> (Catalog, Route) {
        let catalog = catalog_of(&[("BTC", "USDT"), ("ETH", "BTC"), ("ETH", "USDT")]);
        let route = catalog.routes()[0].clone();
        assert!(route.leg2_inverted);
        (catalog, route)
    }

    #[test]
    fn test_profitable_cycle_is_reported() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        // Flat books at 1.0 with a 5% premium on the closing bid.
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.05), dec!(10000))], &[]);

        let result = evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).unwrap();
        // 100 * 0.999^3 * 1.05 ≈ 104.69 after three leg fees.
        assert_eq!(result.profit_percent.round_dp(9), dec!(4.685314895));
        assert_eq!(result.profit.round_dp(9), dec!(4.685314895));
        assert_eq!(result.liquidity, dec!(10000));
        assert_eq!(result.route, route);
    }

    #[test]
    fn test_thin_premium_falls_under_threshold() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        // 1.001 on the closing bid cannot outrun three 0.1% fees.
        let book3 = book(&[(dec!(1.001), dec!(10000))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_identical_inputs_yield_identical_results() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.05), dec!(10000))], &[]);

        let first = evaluate_route(&route, &catalog, &book1, &book2, &book3, &config);
        let second = evaluate_route(&route, &catalog, &book1, &book2, &book3, &config);
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_empty_leg1_asks_abort() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[(dec!(1.0), dec!(10000))], &[]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.05), dec!(10000))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_one_sided_leg2_book_aborts() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.05), dec!(10000))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_liquidity_below_band_is_rejected() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        // Closing top-of-book is 52.5 notional, under the 100 minimum,
        // even though the cycle itself would clear the profit threshold.
        let book3 = book(&[(dec!(1.05), dec!(50))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_liquidity_above_band_is_rejected() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(1000000))]);
        let book2 = book(&[(dec!(0.99), dec!(1000000))], &[(dec!(1.0), dec!(1000000))]);
        let book3 = book(&[(dec!(1.05), dec!(1000000))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_absurd_cycle_fails_sanity_bound() {
        let (catalog, route) = base_coin_setup();
        let config = ScannerConfig::default();
        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        let book2 = book(&[(dec!(0.99), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        // A 20x closing bid is corrupt data, not a 1900% opportunity.
        let book3 = book(&[(dec!(20), dec!(10000))], &[]);

        assert!(evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).is_none());
    }

    #[test]
    fn test_stable_coin_a_consumes_leg2_asks() {
        // USDC enters leg1 as a coin even though it classifies stable.
        let catalog = catalog_of(&[("USDC", "USDT"), ("BBB", "USDC"), ("BBB", "USDT")]);
        let route = catalog
            .routes()
            .iter()
            .find(|r| r.coin_a() == "USDC")
            .unwrap()
            .clone();
        assert!(route.leg2_inverted);
        let config = ScannerConfig::default();

        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        // Asks at 1.0 price the cycle at ~24.6%; consuming the 0.5 bids
        // instead would double amount B and report ~149%.
        let book2 = book(&[(dec!(0.5), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.25), dec!(10000))], &[]);

        let result = evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).unwrap();
        assert_eq!(result.profit_percent.round_dp(9), dec!(24.625374875));
    }

    #[test]
    fn test_stable_coin_b_consumes_leg2_bids() {
        // Leg2 here is BBB/USDC direct, so coin B classifies stable.
        let catalog = catalog_of(&[("BBB", "USDT"), ("BBB", "USDC"), ("USDC", "USDT")]);
        let route = catalog
            .routes()
            .iter()
            .find(|r| r.coin_a() == "BBB")
            .unwrap()
            .clone();
        assert!(!route.leg2_inverted);
        let config = ScannerConfig::default();

        let book1 = book(&[], &[(dec!(1.0), dec!(10000))]);
        // Bids at 0.8 divide amount A up to ~124.6; the asks at 1.0 would
        // leave the cycle under the profit threshold.
        let book2 = book(&[(dec!(0.8), dec!(10000))], &[(dec!(1.0), dec!(10000))]);
        let book3 = book(&[(dec!(1.0), dec!(10000))], &[]);

        let result = evaluate_route(&route, &catalog, &book1, &book2, &book3, &config).unwrap();
        assert_eq!(result.profit_percent, dec!(24.625374875));
    }
}
