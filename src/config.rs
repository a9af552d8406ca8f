use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Tuning knobs for the scan engine. Every field can be overridden from the
/// environment; malformed values fall back to the defaults below.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Proportional taker fee, applied once per leg (0.001 = 0.1%).
    pub fee_rate: Decimal,
    /// Stable-currency notional committed to each cycle.
    pub trade_notional: Decimal,
    /// Routes below this net percentage are dropped.
    pub min_profit_percent: Decimal,
    /// Acceptable band for the limiting top-of-book liquidity.
    pub min_liquidity: Decimal,
    pub max_liquidity: Decimal,
    /// Pause between per-route evaluations (provider rate limits).
    pub route_pacing: Duration,
    /// Pause between full passes.
    pub cycle_delay: Duration,
    /// How many ranked results each pass reports.
    pub page_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.001),
            trade_notional: dec!(100),
            min_profit_percent: dec!(0.5),
            min_liquidity: dec!(100),
            max_liquidity: dec!(500000),
            route_pacing: Duration::from_millis(50),
            cycle_delay: Duration::from_secs(10),
            page_size: 10,
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fee_rate: env_parse("SCANNER_FEE_RATE", defaults.fee_rate),
            trade_notional: env_parse("SCANNER_TRADE_NOTIONAL", defaults.trade_notional),
            min_profit_percent: env_parse("SCANNER_MIN_PROFIT_PCT", defaults.min_profit_percent),
            min_liquidity: env_parse("SCANNER_MIN_LIQUIDITY", defaults.min_liquidity),
            max_liquidity: env_parse("SCANNER_MAX_LIQUIDITY", defaults.max_liquidity),
            route_pacing: Duration::from_millis(env_parse(
                "SCANNER_ROUTE_PACING_MS",
                defaults.route_pacing.as_millis() as u64,
            )),
            cycle_delay: Duration::from_secs(env_parse(
                "SCANNER_CYCLE_DELAY_SECS",
                defaults.cycle_delay.as_secs(),
            )),
            page_size: env_parse("SCANNER_PAGE_SIZE", defaults.page_size),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
