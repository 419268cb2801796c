//! Fixed-fraction risk per trade.
//!
//! Given an account balance, the amount to put at risk on a single trade is
//! `balance * fraction`, reported to cents with half-up rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places used for every monetary figure.
const MONEY_DP: u32 = 2;

/// Rejected sizing input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// Zero or negative balances have no meaningful position size.
    #[error("balance must be positive, got {0}")]
    NonPositiveBalance(Decimal),
}

/// Output of a sizing calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAdvice {
    /// Balance the advice was computed for, rounded to cents.
    pub balance: Decimal,
    /// Amount to risk on one trade, rounded to cents.
    pub risk_amount: Decimal,
    /// Fraction of the balance that `risk_amount` represents.
    pub fraction: Decimal,
}

impl RiskAdvice {
    /// Fraction expressed as a percentage, without trailing zeros (e.g. `1`, `0.5`).
    pub fn percent(&self) -> Decimal {
        (self.fraction * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Fixed-fraction position sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskCalculator {
    fraction: Decimal,
}

impl Default for RiskCalculator {
    /// Classic 1% rule.
    fn default() -> Self {
        Self {
            fraction: Decimal::new(1, 2),
        }
    }
}

impl RiskCalculator {
    /// Create a calculator risking `fraction` of the balance. Out-of-range
    /// fractions are clamped to `(0, 1]`; zero or negative falls back to 1%.
    pub fn new(fraction: Decimal) -> Self {
        if fraction <= Decimal::ZERO {
            return Self::default();
        }
        Self {
            fraction: fraction.min(Decimal::ONE),
        }
    }

    pub fn fraction(&self) -> Decimal {
        self.fraction
    }

    /// Compute the per-trade risk for `balance`.
    pub fn compute(&self, balance: Decimal) -> Result<RiskAdvice, RiskError> {
        if balance <= Decimal::ZERO {
            return Err(RiskError::NonPositiveBalance(balance));
        }
        Ok(RiskAdvice {
            balance: round_money(balance),
            risk_amount: round_money(balance * self.fraction),
            fraction: self.fraction,
        })
    }
}

/// Round to cents, half away from zero (half-up for positive amounts).
fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    // Keep the scale fixed so that formatting always shows two decimals.
    rounded.rescale(MONEY_DP);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_one_percent_of_500() {
        let advice = RiskCalculator::default().compute(dec("500")).unwrap();
        assert_eq!(advice.risk_amount, dec("5.00"));
        assert_eq!(advice.risk_amount.to_string(), "5.00");
        assert_eq!(advice.balance.to_string(), "500.00");
    }

    #[test]
    fn test_one_percent_of_2000() {
        let advice = RiskCalculator::default().compute(dec("2000")).unwrap();
        assert_eq!(advice.risk_amount.to_string(), "20.00");
    }

    #[test]
    fn test_half_up_rounding() {
        let calc = RiskCalculator::default();
        // 12.345 * 0.01 = 0.12345 -> 0.12
        assert_eq!(calc.compute(dec("12.345")).unwrap().risk_amount, dec("0.12"));
        // 0.5 * 0.01 = 0.005 -> 0.01 (midpoint rounds up, not to even)
        assert_eq!(calc.compute(dec("0.5")).unwrap().risk_amount, dec("0.01"));
        // 150.5 * 0.01 = 1.505 -> 1.51
        assert_eq!(calc.compute(dec("150.5")).unwrap().risk_amount, dec("1.51"));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calc = RiskCalculator::default();
        let a = calc.compute(dec("1000")).unwrap();
        let b = calc.compute(dec("1000")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.risk_amount.to_string(), "10.00");
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        let calc = RiskCalculator::default();
        assert_eq!(
            calc.compute(Decimal::ZERO),
            Err(RiskError::NonPositiveBalance(Decimal::ZERO))
        );
        assert!(calc.compute(dec("-100")).is_err());
    }

    #[test]
    fn test_custom_fraction_and_clamps() {
        let advice = RiskCalculator::new(dec("0.02")).compute(dec("1000")).unwrap();
        assert_eq!(advice.risk_amount, dec("20.00"));
        assert_eq!(advice.percent(), dec("2"));

        assert_eq!(RiskCalculator::new(dec("5")).fraction(), Decimal::ONE);
        assert_eq!(RiskCalculator::new(dec("-1")).fraction(), dec("0.01"));
    }

    #[test]
    fn test_percent_formats_without_trailing_zeros() {
        let advice = RiskCalculator::new(dec("0.005")).compute(dec("100")).unwrap();
        assert_eq!(advice.percent().to_string(), "0.5");
        assert_eq!(advice.risk_amount.to_string(), "0.50");
    }

    #[test]
    fn test_advice_serializes_amounts_as_strings() {
        let advice = RiskCalculator::default().compute(dec("2000")).unwrap();
        let json = serde_json::to_value(advice).unwrap();
        assert_eq!(json["risk_amount"], "20.00");
    }
}
