// 💰 Rounding & Numeric Guards
// Half-up money rounding on Decimal, fixed-precision rounding, NaN/∞ guards

use crate::errors::{CalcError, CalcResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Money precision (cents)
pub const MONEY_DP: u32 = 2;

/// Convert through the shortest decimal representation of the float,
/// so 0.1 becomes exactly 0.1 and not its binary expansion.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round half away from zero at `dp` places
pub fn round_dp(value: f64, dp: u32) -> f64 {
    match to_decimal(value) {
        Some(d) => to_f64(d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)),
        None => value,
    }
}

/// Money rounding: half-up at 2 decimals
pub fn round_money(value: f64) -> f64 {
    round_dp(value, MONEY_DP)
}

pub fn round_money_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal cents back to f64 for JSON output
pub fn money(value: Decimal) -> f64 {
    to_f64(round_money_decimal(value))
}

/// Reject NaN and ±∞ as distinct failures
pub fn ensure_finite(value: f64, context: &str) -> CalcResult<f64> {
    if value.is_nan() {
        Err(CalcError::NotANumber {
            context: context.to_string(),
        })
    } else if value.is_infinite() {
        Err(CalcError::Infinite {
            context: context.to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Division that fails explicitly instead of producing NaN/∞
pub fn safe_div(numerator: f64, denominator: f64, context: &str) -> CalcResult<f64> {
    if denominator == 0.0 {
        return Err(CalcError::division_by_zero(context));
    }
    ensure_finite(numerator / denominator, context)
}

/// Percentage of `part` in `whole`
pub fn percent_of(part: f64, whole: f64, context: &str) -> CalcResult<f64> {
    Ok(safe_div(part, whole, context)? * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(2.675), 2.68, "2.675 must round up, not to 2.67");
        assert_eq!(round_money(1.005), 1.01);
        assert_eq!(round_money(-1.005), -1.01);
        assert_eq!(round_money(24.221453287197235), 24.22);
    }

    #[test]
    fn test_round_dp_precision() {
        assert_eq!(round_dp(3.14159265, 4), 3.1416);
        assert_eq!(round_dp(0.0000004, 6), 0.0);
        assert_eq!(round_dp(1628.894626777442, 2), 1628.89);
    }

    #[test]
    fn test_decimal_money() {
        assert_eq!(round_money_decimal(dec!(2124.7045)), dec!(2124.70));
        assert_eq!(money(dec!(0.125)), 0.13);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(matches!(ensure_finite(f64::NAN, "x"), Err(CalcError::NotANumber { .. })));
        assert!(matches!(ensure_finite(f64::INFINITY, "x"), Err(CalcError::Infinite { .. })));
        assert_eq!(ensure_finite(1.5, "x").unwrap(), 1.5);
    }

    #[test]
    fn test_safe_div_zero() {
        assert!(matches!(safe_div(1.0, 0.0, "ratio"), Err(CalcError::DivisionByZero { .. })));
        assert_eq!(percent_of(1.0, 4.0, "pct").unwrap(), 25.0);
    }
}
