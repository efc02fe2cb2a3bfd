//! What-if: change the installment or the remaining duration and solve for
//! the other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::progress::reconstruct_progress;
use super::{fmt_money, fmt_months, payoff_date, period_shift, InterestDelta};
use crate::amortization::{
    ceil_periods, compute_installment, minimum_installment, periods_to_amortize, Inversion,
};
use crate::error::LoanEngineError;
use crate::types::{LoanSnapshot, Money, Months};
use crate::LoanEngineResult;

/// The one lever a caller pulls; the simulator solves for the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImpactChange {
    /// Pay a different EMI; solve for remaining duration.
    InstallmentChange { new_installment: Money },
    /// Finish in a different number of months; solve for the EMI.
    DurationChange { new_remaining_periods: Months },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub change: ImpactChange,
    /// False when the requested installment can never clear the balance.
    /// Durations and deltas are then left at their current values.
    pub achievable: bool,
    pub periods_elapsed: Months,
    pub current_remaining_periods: Months,
    pub new_installment: Money,
    pub new_remaining_periods: Months,
    pub total_payable_before: Money,
    pub total_payable_after: Money,
    pub interest_saved: Money,
    pub interest_increased: Money,
    pub periods_saved: Months,
    pub periods_added: Months,
    pub new_end_date: NaiveDate,
}

/// Preview `change` against the current state of `loan`.
///
/// Flat loans are inverted with the annual rate applied once to the balance,
/// undiscounted for time already elapsed. The same approximation is used by
/// the prepayment simulator, so both agree on the same loan.
pub fn simulate_impact(loan: &LoanSnapshot, change: ImpactChange) -> LoanEngineResult<ImpactResult> {
    loan.validate()?;
    if loan.is_repaid() {
        return Err(LoanEngineError::validation(
            "status",
            "Loan is already repaid; nothing to simulate",
        ));
    }
    debug!(?change, loan_id = %loan.id, "simulating impact");

    let progress = reconstruct_progress(loan);
    let elapsed = progress.periods_elapsed;
    let current = progress.periods_remaining;
    let total_payable_before = loan.installment * f64::from(current);

    let (new_installment, new_periods) = match change {
        ImpactChange::InstallmentChange { new_installment } => {
            if !new_installment.is_finite() || new_installment <= 0.0 {
                return Err(LoanEngineError::validation(
                    "new_installment",
                    "Installment must be greater than zero",
                ));
            }
            match periods_to_amortize(
                loan.outstanding_balance,
                loan.interest_rate_pct,
                new_installment,
                loan.interest_type,
            ) {
                Inversion::Periods(n) => (new_installment, n.max(1)),
                Inversion::Indeterminate => {
                    warn!(
                        rate_pct = loan.interest_rate_pct,
                        "annuity inversion not finite; ignoring interest in duration"
                    );
                    let n = ceil_periods(loan.outstanding_balance / new_installment);
                    (new_installment, n.max(1))
                }
                Inversion::Infeasible => {
                    debug!(new_installment, "installment cannot amortize balance");
                    return Ok(ImpactResult {
                        change,
                        achievable: false,
                        periods_elapsed: elapsed,
                        current_remaining_periods: current,
                        new_installment,
                        new_remaining_periods: current,
                        total_payable_before,
                        total_payable_after: total_payable_before,
                        interest_saved: 0.0,
                        interest_increased: 0.0,
                        periods_saved: 0,
                        periods_added: 0,
                        new_end_date: payoff_date(loan.start_date, elapsed, current)?,
                    });
                }
            }
        }
        ImpactChange::DurationChange {
            new_remaining_periods,
        } => {
            let installment = compute_installment(
                loan.outstanding_balance,
                loan.interest_rate_pct,
                new_remaining_periods,
                loan.interest_type,
            )?;
            (installment, new_remaining_periods)
        }
    };

    let total_payable_after = new_installment * f64::from(new_periods);
    let delta = InterestDelta::between(total_payable_before, total_payable_after);
    let (periods_saved, periods_added) = period_shift(current, new_periods);

    Ok(ImpactResult {
        change,
        achievable: true,
        periods_elapsed: elapsed,
        current_remaining_periods: current,
        new_installment,
        new_remaining_periods: new_periods,
        total_payable_before,
        total_payable_after,
        interest_saved: delta.saved,
        interest_increased: delta.increased,
        periods_saved,
        periods_added,
        new_end_date: payoff_date(loan.start_date, elapsed, new_periods)?,
    })
}

/// Gate for offering "apply" on an installment change: the new EMI must be
/// positive and clear [`minimum_installment`].
pub fn validate_installment_change(
    loan: &LoanSnapshot,
    new_installment: Money,
) -> LoanEngineResult<()> {
    if !new_installment.is_finite() || new_installment <= 0.0 {
        return Err(LoanEngineError::validation(
            "new_installment",
            "Installment must be greater than zero",
        ));
    }
    let minimum = minimum_installment(loan);
    if new_installment < minimum {
        return Err(LoanEngineError::validation(
            "new_installment",
            format!(
                "Installment {} is below the minimum viable {}",
                fmt_money(new_installment),
                fmt_money(minimum)
            ),
        ));
    }
    Ok(())
}

/// Human-readable summary of an impact preview, most favourable first.
pub fn generate_impact_notes(result: &ImpactResult) -> Vec<String> {
    if !result.achievable {
        return vec![format!(
            "An installment of {} does not cover the monthly interest; the loan would never close",
            fmt_money(result.new_installment)
        )];
    }

    let mut notes = Vec::new();
    if result.interest_saved > 0.0 {
        notes.push(format!(
            "You save {} in total payments",
            fmt_money(result.interest_saved)
        ));
    }
    if result.periods_saved > 0 {
        notes.push(format!(
            "Loan closes {} earlier, on {}",
            fmt_months(result.periods_saved),
            result.new_end_date
        ));
    }
    if result.interest_increased > 0.0 {
        notes.push(format!(
            "Warning: you pay {} more in total",
            fmt_money(result.interest_increased)
        ));
    }
    if result.periods_added > 0 {
        notes.push(format!(
            "Warning: loan runs {} longer, until {}",
            fmt_months(result.periods_added),
            result.new_end_date
        ));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{InterestType, LoanRole, LoanStatus};

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

    /// Fresh 24-month reducing loan: elapsed 0, remaining 24.
    fn fresh_loan() -> LoanSnapshot {
        LoanSnapshot {
            id: "home".into(),
            principal: 120_000.0,
            interest_rate_pct: 12.0,
            interest_type: InterestType::Reducing,
            original_tenure_months: 24,
            installment: compute_installment(120_000.0, 12.0, 24, InterestType::Reducing).unwrap(),
            outstanding_balance: 120_000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: LoanStatus::Active,
            role: LoanRole::Borrowed,
        }
    }

    #[test]
    fn test_higher_installment_shortens_loan() {
        let loan = fresh_loan();
        let target = compute_installment(120_000.0, 12.0, 18, InterestType::Reducing).unwrap();
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: target,
            },
        )
        .unwrap();
        assert!(r.achievable);
        assert_eq!(r.new_remaining_periods, 18);
        assert_eq!(r.periods_saved, 6);
        assert_eq!(r.periods_added, 0);
        assert!(r.interest_saved > 0.0);
        assert_eq!(r.interest_increased, 0.0);
        assert_eq!(r.new_end_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn test_longer_duration_lowers_installment_and_costs_more() {
        let loan = fresh_loan();
        let r = simulate_impact(
            &loan,
            ImpactChange::DurationChange {
                new_remaining_periods: 36,
            },
        )
        .unwrap();
        assert!(r.new_installment < loan.installment);
        assert_eq!(r.periods_added, 12);
        assert_eq!(r.interest_saved, 0.0);
        assert!(r.interest_increased > 0.0);
        assert_close(
            r.total_payable_after - r.total_payable_before,
            r.interest_increased,
            1e-6,
            "increase equals payable delta",
        );
    }

    #[test]
    fn test_very_long_duration_stays_finite() {
        // 120k at 12%: the EMI approaches the 1200/month interest
        let r = simulate_impact(
            &fresh_loan(),
            ImpactChange::DurationChange {
                new_remaining_periods: 80_000,
            },
        )
        .unwrap();
        assert!(r.new_installment.is_finite());
        assert_close(r.new_installment, 1_200.0, 1e-6, "interest-only limit");
        assert!(r.interest_increased.is_finite() && r.interest_increased > 0.0);
        assert_eq!(r.interest_saved, 0.0);
    }

    #[test]
    fn test_unchanged_duration_has_no_delta() {
        let loan = fresh_loan();
        let r = simulate_impact(
            &loan,
            ImpactChange::DurationChange {
                new_remaining_periods: 24,
            },
        )
        .unwrap();
        assert_close(r.new_installment, loan.installment, 1e-9, "same EMI");
        assert_eq!(r.periods_saved, 0);
        assert_eq!(r.periods_added, 0);
        assert!(r.interest_saved < 1e-6 && r.interest_increased < 1e-6);
    }

    #[test]
    fn test_infeasible_installment_is_a_sentinel_not_an_error() {
        let loan = fresh_loan();
        // 120k at 12% accrues 1200/month
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: 1_100.0,
            },
        )
        .unwrap();
        assert!(!r.achievable);
        assert_eq!(r.new_remaining_periods, r.current_remaining_periods);
        assert_eq!(r.interest_saved, 0.0);
        assert_eq!(r.interest_increased, 0.0);
        let notes = generate_impact_notes(&r);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("never close"));
    }

    #[test]
    fn test_flat_inversion_uses_annual_rate_once() {
        let loan = LoanSnapshot {
            interest_type: InterestType::Flat,
            installment: 6_200.0,
            ..fresh_loan()
        };
        // (120k + 12%) / 8000 = 16.8 => 17
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: 8_000.0,
            },
        )
        .unwrap();
        assert_eq!(r.new_remaining_periods, 17);
    }

    #[test]
    fn test_zero_rate_installment_change() {
        let loan = LoanSnapshot {
            interest_rate_pct: 0.0,
            installment: 5_000.0,
            outstanding_balance: 50_000.0,
            interest_type: InterestType::Flat,
            ..fresh_loan()
        };
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: 10_000.0,
            },
        )
        .unwrap();
        assert_eq!(r.new_remaining_periods, 5);
    }

    #[test]
    fn test_non_positive_installment_rejected() {
        let err = simulate_impact(
            &fresh_loan(),
            ImpactChange::InstallmentChange {
                new_installment: 0.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, LoanEngineError::Validation { .. }));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = simulate_impact(
            &fresh_loan(),
            ImpactChange::DurationChange {
                new_remaining_periods: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, LoanEngineError::InvalidArgument { .. }));
    }

    #[test]
    fn test_repaid_loan_rejected() {
        let loan = LoanSnapshot {
            status: LoanStatus::Closed,
            ..fresh_loan()
        };
        let err = simulate_impact(
            &loan,
            ImpactChange::DurationChange {
                new_remaining_periods: 12,
            },
        )
        .unwrap_err();
        match err {
            LoanEngineError::Validation { field, .. } => assert_eq!(field, "status"),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_installment_change_enforces_minimum() {
        let loan = fresh_loan();
        // minimum = 1200 * 1.1 = 1320
        assert!(validate_installment_change(&loan, 1_300.0).is_err());
        assert!(validate_installment_change(&loan, 1_400.0).is_ok());
        assert!(validate_installment_change(&loan, -5.0).is_err());
    }

    #[test]
    fn test_notes_order_saving_then_closure() {
        let loan = fresh_loan();
        let target = compute_installment(120_000.0, 12.0, 12, InterestType::Reducing).unwrap();
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: target,
            },
        )
        .unwrap();
        let notes = generate_impact_notes(&r);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].starts_with("You save"));
        assert!(notes[1].starts_with("Loan closes 12 months earlier"));
    }

    #[test]
    fn test_notes_warn_on_extension() {
        let r = simulate_impact(
            &fresh_loan(),
            ImpactChange::DurationChange {
                new_remaining_periods: 25,
            },
        )
        .unwrap();
        let notes = generate_impact_notes(&r);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].starts_with("Warning: you pay"));
        assert_eq!(notes[1], format!("Warning: loan runs 1 month longer, until {}", r.new_end_date));
    }

    #[test]
    fn test_applied_impact_reconstructs_consistently() {
        let loan = fresh_loan();
        let target = compute_installment(120_000.0, 12.0, 20, InterestType::Reducing).unwrap();
        let r = simulate_impact(
            &loan,
            ImpactChange::InstallmentChange {
                new_installment: target,
            },
        )
        .unwrap();
        let applied = loan.with_impact(&r);
        assert_eq!(applied.original_tenure_months, 20);
        assert_eq!(reconstruct_progress(&applied).periods_remaining, 20);
    }
}
