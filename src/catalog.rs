use crate::shared_types::{CurrencyClass, Route, TradingPair};
use std::collections::{HashMap, HashSet};

/// Stable hub currencies, in the order route enumeration visits them.
const STABLE_HUBS: [&str; 7] = ["USDT", "USDC", "DAI", "USDE", "USDR", "TUSD", "BUSD"];

/// Major non-stable currencies.
const MAJOR_COINS: [&str; 4] = ["BTC", "ETH", "BNB", "SOL"];

pub fn classify(coin: &str) -> CurrencyClass {
    if STABLE_HUBS.contains(&coin) {
        CurrencyClass::Stable
    } else if MAJOR_COINS.contains(&coin) {
        CurrencyClass::Base
    } else {
        CurrencyClass::Alt
    }
}

/// Immutable snapshot of the tradable universe: one class per currency and
/// every valid triangular route. Built once at startup and shared read-only
/// with the scan loop; a catalog refresh means building a new value.
#[derive(Debug, Default)]
pub struct Catalog {
    classes: HashMap<String, CurrencyClass>,
    routes: Vec<Route>,
}

impl Catalog {
    /// Enumerates routes from the tradable pair set. For each stable hub S
    /// and each ordered pair of distinct coins (A, B) both quoted in S, a
    /// route exists when a connecting pair B/A (inverted) or A/B (direct)
    /// is listed. A→B and B→A are distinct routes; both are kept.
    ///
    /// Output order is deterministic: hubs in declared order, coins in
    /// catalog input order. An empty catalog yields an empty route set.
    pub fn build(pairs: &[TradingPair]) -> Self {
        let mut classes = HashMap::new();
        for pair in pairs {
            for coin in [&pair.base, &pair.quote] {
                classes
                    .entry(coin.clone())
                    .or_insert_with(|| classify(coin));
            }
        }

        let listed: HashSet<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.base.as_str(), p.quote.as_str()))
            .collect();

        let mut routes = Vec::new();
        for stable in STABLE_HUBS {
            let mut hub_coins = Vec::new();
            let mut seen = HashSet::new();
            for pair in pairs {
                if pair.quote == stable && seen.insert(pair.base.as_str()) {
                    hub_coins.push(pair.base.as_str());
                }
            }

            for &a in &hub_coins {
                for &b in &hub_coins {
                    if a == b {
                        continue;
                    }
                    let (leg2, leg2_inverted) = if listed.contains(&(b, a)) {
                        (TradingPair::new(b, a), true)
                    } else if listed.contains(&(a, b)) {
                        (TradingPair::new(a, b), false)
                    } else {
                        continue;
                    };
                    routes.push(Route {
                        leg1: TradingPair::new(a, stable),
                        leg2,
                        leg3: TradingPair::new(b, stable),
                        leg2_inverted,
                    });
                }
            }
        }

        Self { classes, routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Unknown coins default to `Alt`, mirroring how live catalogs drift.
    pub fn class_of(&self, coin: &str) -> CurrencyClass {
        self.classes.get(coin).copied().unwrap_or(CurrencyClass::Alt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pairs(specs: &[(&str, &str)]) -> Vec<TradingPair> {
        specs.iter().map(|(b, q)| TradingPair::new(b, q)).collect()
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify("USDT"), CurrencyClass::Stable);
        assert_eq!(classify("USDC"), CurrencyClass::Stable);
        assert_eq!(classify("BTC"), CurrencyClass::Base);
        assert_eq!(classify("SOL"), CurrencyClass::Base);
        assert_eq!(classify("DOGE"), CurrencyClass::Alt);
    }

    #[test]
    fn test_unknown_coin_defaults_to_alt() {
        let catalog = Catalog::build(&[]);
        assert_eq!(catalog.class_of("NEWCOIN"), CurrencyClass::Alt);
    }

    #[test]
    fn test_empty_catalog_builds_no_routes() {
        assert!(Catalog::build(&[]).routes().is_empty());
    }

    #[test]
    fn test_both_directions_are_emitted() {
        let catalog = Catalog::build(&pairs(&[
            ("BTC", "USDT"),
            ("ETH", "BTC"),
            ("ETH", "USDT"),
        ]));
        let routes = catalog.routes();
        assert_eq!(routes.len(), 2);

        // BTC -> ETH: the connecting pair ETH/BTC is quoted B/A.
        assert_eq!(routes[0].leg1, TradingPair::new("BTC", "USDT"));
        assert_eq!(routes[0].leg2, TradingPair::new("ETH", "BTC"));
        assert_eq!(routes[0].leg3, TradingPair::new("ETH", "USDT"));
        assert!(routes[0].leg2_inverted);
        assert_eq!(routes[0].coin_a(), "BTC");
        assert_eq!(routes[0].coin_b(), "ETH");

        // ETH -> BTC rides the same pair in the direct orientation.
        assert_eq!(routes[1].leg1, TradingPair::new("ETH", "USDT"));
        assert_eq!(routes[1].leg2, TradingPair::new("ETH", "BTC"));
        assert_eq!(routes[1].leg3, TradingPair::new("BTC", "USDT"));
        assert!(!routes[1].leg2_inverted);
        assert_eq!(routes[1].coin_a(), "ETH");
        assert_eq!(routes[1].coin_b(), "BTC");
    }

    #[rstest]
    #[case(("BBB", "AAA"), true)]
    #[case(("AAA", "BBB"), false)]
    fn test_leg2_orientation_sets_inversion(
        #[case] connecting: (&str, &str),
        #[case] inverted: bool,
    ) {
        let catalog = Catalog::build(&pairs(&[
            ("AAA", "USDT"),
            connecting,
            ("BBB", "USDT"),
        ]));
        let route = catalog
            .routes()
            .iter()
            .find(|r| r.coin_a() == "AAA")
            .unwrap();
        assert_eq!(route.leg2_inverted, inverted);
        assert_eq!(route.coin_b(), "BBB");
        assert_eq!(route.stable(), "USDT");
    }

    #[test]
    fn test_missing_closing_leg_builds_no_route() {
        let catalog = Catalog::build(&pairs(&[("BTC", "USDT"), ("ETH", "BTC")]));
        assert!(catalog.routes().is_empty());
    }

    #[test]
    fn test_unconnected_coins_build_no_route() {
        let catalog = Catalog::build(&pairs(&[("BTC", "USDT"), ("XRP", "USDT")]));
        assert!(catalog.routes().is_empty());
    }

    #[test]
    fn test_hub_order_is_deterministic() {
        let catalog = Catalog::build(&pairs(&[
            ("BTC", "USDC"),
            ("ETH", "USDC"),
            ("BTC", "USDT"),
            ("ETH", "USDT"),
            ("ETH", "BTC"),
        ]));
        let stables: Vec<&str> = catalog.routes().iter().map(|r| r.stable()).collect();
        // USDT routes first regardless of input order, then USDC.
        assert_eq!(stables, vec!["USDT", "USDT", "USDC", "USDC"]);
    }
}
