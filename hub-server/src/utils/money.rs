//! Money helpers
//!
//! Amounts are stored and serialized as `f64`; all arithmetic goes through
//! `Decimal` and is rounded to 2 decimal places, half away from zero.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a Decimal to money precision
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

/// Round an f64 amount (e.g. an SQL SUM) to money precision
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(-1005, 3)), -1.01);
        assert_eq!(to_f64(Decimal::new(1004, 3)), 1.0);
    }

    #[test]
    fn sums_without_float_drift() {
        let total = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(total), 0.3);
        assert_eq!(round_money(10.0 * 1.1), 11.0);
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
