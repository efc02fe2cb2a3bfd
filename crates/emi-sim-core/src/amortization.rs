//! Installment formulas and the annuity inversion shared by every simulator.
//!
//! All math in `f64`. Durations are rounded only through [`ceil_periods`]
//! and [`floor_periods`]; currency is never rounded here.

use serde::{Deserialize, Serialize};

use crate::error::LoanEngineError;
use crate::types::{InterestType, LoanSnapshot, Money, Months, RatePct, MONTHLY_RATE_DIVISOR};
use crate::LoanEngineResult;

/// Multiplier over one month's interest that an installment must clear to be
/// viable. A policy margin guaranteeing positive principal reduction, not a
/// derived minimum.
pub const MIN_INSTALLMENT_MARGIN: f64 = 1.1;

/// Slack absorbed before rounding a fractional duration up, so that
/// `24.000000000003` months stays 24.
pub const PERIOD_EPSILON: f64 = 1e-9;

/// Outcome of solving the annuity identity for the number of periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inversion {
    /// Periods needed to clear the balance, rounded up.
    Periods(Months),
    /// The installment does not cover the interest; the balance never clears.
    Infeasible,
    /// The logarithms did not produce a finite answer.
    Indeterminate,
}

/// Level installment for a loan of `tenure_months`.
///
/// Flat: `(P + P·rate·n/1200) / n`. Reducing: the standard annuity payment,
/// or `P / n` at a zero rate.
pub fn compute_installment(
    principal: Money,
    rate_pct: RatePct,
    tenure_months: Months,
    interest_type: InterestType,
) -> LoanEngineResult<Money> {
    if tenure_months < 1 {
        return Err(LoanEngineError::invalid(
            "tenure_months",
            "Tenure must be at least one month",
        ));
    }
    if !principal.is_finite() || principal < 0.0 {
        return Err(LoanEngineError::invalid(
            "principal",
            "Principal must be a non-negative amount",
        ));
    }
    if !rate_pct.is_finite() || rate_pct < 0.0 {
        return Err(LoanEngineError::invalid(
            "rate_pct",
            "Interest rate must be a non-negative percentage",
        ));
    }

    let n = f64::from(tenure_months);
    let installment = match interest_type {
        InterestType::Flat => {
            let total_interest = principal * rate_pct * n / MONTHLY_RATE_DIVISOR;
            (principal + total_interest) / n
        }
        InterestType::Reducing => {
            let r = rate_pct / MONTHLY_RATE_DIVISOR;
            if r == 0.0 {
                return Ok(principal / n);
            }
            // 1 − (1+r)^−n, tending to 1 for long tenures and to n·r for tiny rates.
            let annuity_share = -(-n * r.ln_1p()).exp_m1();
            principal * r / annuity_share
        }
    };
    if !installment.is_finite() {
        return Err(LoanEngineError::invalid(
            "principal",
            "Installment is not representable for these loan terms",
        ));
    }
    Ok(installment)
}

/// Smallest installment the engine will accept as a replacement EMI:
/// one month's interest on the outstanding balance, plus the margin.
pub fn minimum_installment(loan: &LoanSnapshot) -> Money {
    loan.outstanding_balance * loan.interest_rate_pct / MONTHLY_RATE_DIVISOR
        * MIN_INSTALLMENT_MARGIN
}

/// Round a fractional duration up to whole months.
pub fn ceil_periods(periods: f64) -> Months {
    if !periods.is_finite() || periods <= 0.0 {
        return 0;
    }
    let rounded = (periods - PERIOD_EPSILON).ceil();
    if rounded <= 0.0 {
        0
    } else {
        // `as` saturates at u32::MAX for absurd durations.
        rounded as Months
    }
}

/// Whole months contained in a fractional duration, with the same tolerance
/// as [`ceil_periods`] so `2.9999999999999996` counts as 3.
pub fn floor_periods(periods: f64) -> Months {
    if !periods.is_finite() || periods <= 0.0 {
        return 0;
    }
    (periods + PERIOD_EPSILON).floor() as Months
}

/// Number of `installment`-sized payments needed to clear `balance`.
///
/// Reducing: `n = ceil(−ln(1 − B·r/e) / ln(1 + r))`, infeasible when
/// `B·r/e ≥ 1`; a zero rate is plain division. Flat: the annual rate is
/// applied once, undiscounted, to the balance: `ceil((B + B·rate/100) / e)`.
pub fn periods_to_amortize(
    balance: Money,
    rate_pct: RatePct,
    installment: Money,
    interest_type: InterestType,
) -> Inversion {
    if balance <= 0.0 {
        return Inversion::Periods(0);
    }
    if !installment.is_finite() || installment <= 0.0 {
        return Inversion::Infeasible;
    }

    match interest_type {
        InterestType::Flat => {
            let payable = balance + balance * rate_pct / 100.0;
            Inversion::Periods(ceil_periods(payable / installment))
        }
        InterestType::Reducing => {
            let r = rate_pct / MONTHLY_RATE_DIVISOR;
            if r == 0.0 {
                return Inversion::Periods(ceil_periods(balance / installment));
            }
            let ratio = balance * r / installment;
            if ratio >= 1.0 {
                return Inversion::Infeasible;
            }
            let n = -(1.0 - ratio).ln() / (1.0 + r).ln();
            if n.is_finite() {
                Inversion::Periods(ceil_periods(n))
            } else {
                Inversion::Indeterminate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::types::{LoanRole, LoanStatus};

    fn assert_close(actual: f64, expected: f64, tol: f64, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn loan(balance: Money, rate: RatePct) -> LoanSnapshot {
        LoanSnapshot {
            id: String::new(),
            principal: 100_000.0,
            interest_rate_pct: rate,
            interest_type: InterestType::Reducing,
            original_tenure_months: 24,
            installment: 4_614.49,
            outstanding_balance: balance,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: LoanStatus::Active,
            role: LoanRole::Borrowed,
        }
    }

    #[test]
    fn test_reducing_known_answer() {
        let emi = compute_installment(100_000.0, 10.0, 12, InterestType::Reducing).unwrap();
        assert_close(emi, 8_791.59, 0.01, "12m @ 10% EMI");
    }

    #[test]
    fn test_reducing_zero_rate_is_exact_division() {
        let emi = compute_installment(100_000.0, 0.0, 12, InterestType::Reducing).unwrap();
        assert_eq!(emi, 100_000.0 / 12.0);
    }

    #[test]
    fn test_flat_identity() {
        let emi = compute_installment(50_000.0, 12.0, 36, InterestType::Flat).unwrap();
        // 50k + 50k * 12 * 36 / 1200 = 68k over 36 months
        assert_close(emi * 36.0, 68_000.0, 1e-6, "flat total payable");
    }

    #[test]
    fn test_zero_tenure_rejected() {
        let err = compute_installment(1_000.0, 5.0, 0, InterestType::Reducing).unwrap_err();
        match err {
            LoanEngineError::InvalidArgument { field, .. } => assert_eq!(field, "tenure_months"),
            other => panic!("Expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_principal_rejected() {
        let err = compute_installment(-1.0, 5.0, 12, InterestType::Flat).unwrap_err();
        assert!(matches!(err, LoanEngineError::InvalidArgument { .. }));
    }

    #[test]
    fn test_very_long_tenure_tends_to_interest_only() {
        // 100k at 12% accrues 1000/month; a near-perpetual loan pays just that
        for tenure in [80_000, 3_000_000_000] {
            let emi = compute_installment(100_000.0, 12.0, tenure, InterestType::Reducing).unwrap();
            assert!(emi.is_finite(), "tenure {tenure}: {emi}");
            assert_close(emi, 1_000.0, 1e-6, "perpetuity limit");
        }
    }

    #[test]
    fn test_vanishing_rate_matches_zero_rate() {
        let emi = compute_installment(120_000.0, 1e-14, 24, InterestType::Reducing).unwrap();
        assert_close(emi, 5_000.0, 1e-6, "tiny rate");
    }

    #[test]
    fn test_unrepresentable_installment_rejected() {
        let err = compute_installment(f64::MAX, 100.0, 1_000, InterestType::Flat).unwrap_err();
        assert!(matches!(err, LoanEngineError::InvalidArgument { .. }));
    }

    #[test]
    fn test_minimum_installment_is_interest_plus_margin() {
        // 60k at 12% => 600 interest per month, 660 with the margin
        assert_close(minimum_installment(&loan(60_000.0, 12.0)), 660.0, 1e-9, "minimum");
        assert_eq!(minimum_installment(&loan(60_000.0, 0.0)), 0.0);
    }

    #[test]
    fn test_ceil_periods_absorbs_float_noise() {
        assert_eq!(ceil_periods(24.000_000_000_003), 24);
        assert_eq!(ceil_periods(24.001), 25);
        assert_eq!(ceil_periods(0.0), 0);
        assert_eq!(ceil_periods(f64::NAN), 0);
    }

    #[test]
    fn test_floor_periods_absorbs_float_noise() {
        assert_eq!(floor_periods(2.999_999_999_999_999_6), 3);
        assert_eq!(floor_periods(4.6), 4);
        assert_eq!(floor_periods(-1.0), 0);
    }

    #[test]
    fn test_inversion_recovers_tenure() {
        let emi = compute_installment(75_000.0, 9.5, 48, InterestType::Reducing).unwrap();
        assert_eq!(
            periods_to_amortize(75_000.0, 9.5, emi, InterestType::Reducing),
            Inversion::Periods(48)
        );
    }

    #[test]
    fn test_inversion_infeasible_when_interest_not_covered() {
        // 100k at 12% accrues 1000/month; 1000 never amortizes
        assert_eq!(
            periods_to_amortize(100_000.0, 12.0, 1_000.0, InterestType::Reducing),
            Inversion::Infeasible
        );
        assert_eq!(
            periods_to_amortize(100_000.0, 12.0, 0.0, InterestType::Reducing),
            Inversion::Infeasible
        );
    }

    #[test]
    fn test_inversion_zero_rate_and_flat() {
        assert_eq!(
            periods_to_amortize(10_000.0, 0.0, 3_000.0, InterestType::Reducing),
            Inversion::Periods(4)
        );
        // 10k + 10% = 11k; 11k / 1k = 11
        assert_eq!(
            periods_to_amortize(10_000.0, 10.0, 1_000.0, InterestType::Flat),
            Inversion::Periods(11)
        );
    }

    #[test]
    fn test_inversion_indeterminate_for_vanishing_rate() {
        // 1 + r rounds to exactly 1.0, so both logarithms are zero
        assert_eq!(
            periods_to_amortize(10_000.0, 1e-14, 1_000.0, InterestType::Reducing),
            Inversion::Indeterminate
        );
    }
}
