use crate::shared_types::{BookLevel, FillResult};
use rust_decimal::Decimal;

/// Walks one book side best-price-first and computes the volume-weighted
/// execution price for `target_notional`. The final level is only partially
/// consumed when the running notional would overshoot the target. Levels are
/// never reordered and never filled below their listed price.
///
/// If the side runs dry before the target is reached, the partial fill is
/// still returned; `None` means nothing was consumable at all.
pub fn simulate_fill(levels: &[BookLevel], target_notional: Decimal) -> Option<FillResult> {
    let mut total = Decimal::ZERO;
    let mut quantity = Decimal::ZERO;

    for level in levels {
        // Non-positive levels carry no notional.
        if level.price <= Decimal::ZERO || level.size <= Decimal::ZERO {
            continue;
        }
        let deal = level.notional();
        if total + deal >= target_notional {
            let partial = (target_notional - total) / level.price;
            quantity += partial;
            total += partial * level.price;
            break;
        }
        total += deal;
        quantity += level.size;
    }

    if quantity.is_zero() {
        return None;
    }

    Some(FillResult {
        average_price: total / quantity,
        filled_notional: total,
    })
}

/// Notional available at the single best level; the conservative liquidity
/// proxy used to gate routes.
pub fn top_of_book_notional(levels: &[BookLevel]) -> Decimal {
    levels.first().map(BookLevel::notional).unwrap_or(Decimal::ZERO)
}
