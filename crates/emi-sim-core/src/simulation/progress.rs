//! Reconstruct repayment progress from a single balance figure.
//!
//! The tracker keeps no payment ledger, so how far a loan has run is
//! *inferred* from `outstanding_balance`: by linear principal share for flat
//! loans, by inverting the annuity identity for reducing ones. The interest
//! split that follows is linear in elapsed periods, which understates interest
//! already paid on reducing loans (their schedules are front-loaded).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amortization::{periods_to_amortize, Inversion};
use crate::types::{InterestType, LoanSnapshot, Money, Months};

/// Scale applied to the linear principal estimate when the annuity inversion
/// breaks down numerically. Empirical; its derivation is unknown, and results
/// using it are flagged with [`ProgressMethod::HeuristicFallback`].
pub const REDUCING_FALLBACK_FACTOR: f64 = 0.85;

/// Which branch produced a [`ProgressResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMethod {
    /// Closed, or nothing outstanding.
    FullyRepaid,
    /// Flat loan: principal repaid as a share of the original principal.
    LinearPrincipal,
    /// Reducing loan: remaining periods solved from the annuity identity.
    AnnuityInversion,
    /// The installment cannot amortize the balance; treated as not started.
    InfeasibleRatio,
    /// Zero rate or no installment on a reducing loan; treated as fully run.
    Degenerate,
    /// The inversion was not finite; linear estimate scaled by
    /// [`REDUCING_FALLBACK_FACTOR`].
    HeuristicFallback,
}

impl ProgressMethod {
    /// True when the figures rest on a heuristic rather than a formula.
    pub fn is_heuristic(self) -> bool {
        matches!(self, ProgressMethod::HeuristicFallback)
    }
}

/// Derived view of how far a loan has run. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressResult {
    pub periods_elapsed: Months,
    pub periods_remaining: Months,
    /// 0–100.
    pub progress_percentage: f64,
    pub remaining_principal: Money,
    /// Linear share of total interest; an approximation.
    pub interest_paid_approx: Money,
    pub interest_remaining_approx: Money,
    pub method: ProgressMethod,
}

/// Infer elapsed and remaining periods and the interest split of `loan`.
///
/// Total over any input: degenerate or stale snapshots map onto one of the
/// [`ProgressMethod`] branches instead of failing.
pub fn reconstruct_progress(loan: &LoanSnapshot) -> ProgressResult {
    let tenure = loan.original_tenure_months;

    if loan.is_repaid() {
        return ProgressResult {
            periods_elapsed: tenure,
            periods_remaining: 0,
            progress_percentage: 100.0,
            remaining_principal: loan.outstanding_balance,
            interest_paid_approx: loan.total_interest(),
            interest_remaining_approx: 0.0,
            method: ProgressMethod::FullyRepaid,
        };
    }

    let (elapsed, method) = match loan.interest_type {
        InterestType::Flat => (linear_elapsed(loan, 1.0), ProgressMethod::LinearPrincipal),
        InterestType::Reducing => reducing_elapsed(loan),
    };
    let elapsed = elapsed.min(tenure);
    let fraction = share(elapsed, tenure);
    let (interest_paid_approx, interest_remaining_approx) =
        linear_interest_split(loan.total_interest(), fraction);

    ProgressResult {
        periods_elapsed: elapsed,
        periods_remaining: tenure - elapsed,
        progress_percentage: fraction * 100.0,
        remaining_principal: loan.outstanding_balance,
        interest_paid_approx,
        interest_remaining_approx,
        method,
    }
}

/// Split `total_interest` into (paid, remaining) proportionally to elapsed time.
pub fn linear_interest_split(total_interest: Money, elapsed_fraction: f64) -> (Money, Money) {
    let paid = total_interest * elapsed_fraction;
    (paid, total_interest - paid)
}

fn share(elapsed: Months, tenure: Months) -> f64 {
    if tenure == 0 {
        0.0
    } else {
        f64::from(elapsed) / f64::from(tenure)
    }
}

/// `round(principal_paid / principal · tenure · scale)`, clamped to the tenure.
fn linear_elapsed(loan: &LoanSnapshot, scale: f64) -> Months {
    if loan.principal <= 0.0 {
        return 0;
    }
    let tenure = f64::from(loan.original_tenure_months);
    let principal_paid = loan.principal - loan.outstanding_balance;
    let estimate = (principal_paid / loan.principal * tenure * scale).round();
    if estimate.is_nan() {
        return 0;
    }
    estimate.clamp(0.0, tenure) as Months
}

fn reducing_elapsed(loan: &LoanSnapshot) -> (Months, ProgressMethod) {
    let tenure = loan.original_tenure_months;
    if loan.monthly_rate() == 0.0 || loan.installment <= 0.0 || loan.outstanding_balance <= 0.0 {
        return (tenure, ProgressMethod::Degenerate);
    }

    match periods_to_amortize(
        loan.outstanding_balance,
        loan.interest_rate_pct,
        loan.installment,
        InterestType::Reducing,
    ) {
        Inversion::Periods(n) => (tenure.saturating_sub(n), ProgressMethod::AnnuityInversion),
        Inversion::Infeasible => {
            debug!(
                installment = loan.installment,
                outstanding = loan.outstanding_balance,
                "installment cannot amortize balance; treating loan as unelapsed"
            );
            (0, ProgressMethod::InfeasibleRatio)
        }
        Inversion::Indeterminate => {
            warn!(
                rate_pct = loan.interest_rate_pct,
                factor = REDUCING_FALLBACK_FACTOR,
                "annuity inversion not finite; using scaled linear estimate"
            );
            (
                linear_elapsed(loan, REDUCING_FALLBACK_FACTOR),
                ProgressMethod::HeuristicFallback,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::amortization::compute_installment;
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

    fn reducing_loan(outstanding: Money) -> LoanSnapshot {
        let installment = compute_installment(120_000.0, 12.0, 24, InterestType::Reducing).unwrap();
        LoanSnapshot {
            id: String::new(),
            principal: 120_000.0,
            interest_rate_pct: 12.0,
            interest_type: InterestType::Reducing,
            original_tenure_months: 24,
            installment,
            outstanding_balance: outstanding,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: LoanStatus::Active,
            role: LoanRole::Borrowed,
        }
    }

    fn flat_loan(outstanding: Money) -> LoanSnapshot {
        LoanSnapshot {
            interest_type: InterestType::Flat,
            installment: compute_installment(120_000.0, 12.0, 24, InterestType::Flat).unwrap(),
            ..reducing_loan(outstanding)
        }
    }

    /// Balance left on an annuity after `k` payments.
    fn balance_after(principal: f64, rate_pct: f64, emi: f64, k: i32) -> f64 {
        let r = rate_pct / 1200.0;
        let g = (1.0 + r).powi(k);
        principal * g - emi * (g - 1.0) / r
    }

    #[test]
    fn test_fresh_reducing_loan_has_nothing_elapsed() {
        let p = reconstruct_progress(&reducing_loan(120_000.0));
        assert_eq!(p.periods_elapsed, 0);
        assert_eq!(p.periods_remaining, 24);
        assert_eq!(p.progress_percentage, 0.0);
        assert_eq!(p.interest_paid_approx, 0.0);
        assert_eq!(p.method, ProgressMethod::AnnuityInversion);
    }

    #[test]
    fn test_reducing_inversion_recovers_payments_made() {
        let loan = reducing_loan(120_000.0);
        let after_ten = balance_after(120_000.0, 12.0, loan.installment, 10);
        let p = reconstruct_progress(&LoanSnapshot {
            outstanding_balance: after_ten,
            ..loan
        });
        assert_eq!(p.periods_elapsed, 10);
        assert_eq!(p.periods_remaining, 14);
        assert_eq!(p.remaining_principal, after_ten);
    }

    #[test]
    fn test_elapsed_plus_remaining_is_tenure() {
        for balance in [5_000.0, 30_000.0, 60_000.0, 90_000.0, 119_000.0] {
            let p = reconstruct_progress(&reducing_loan(balance));
            assert_eq!(p.periods_elapsed + p.periods_remaining, 24);
        }
    }

    #[test]
    fn test_flat_linear_principal_share() {
        // Half the principal repaid => half the tenure elapsed
        let p = reconstruct_progress(&flat_loan(60_000.0));
        assert_eq!(p.periods_elapsed, 12);
        assert_eq!(p.method, ProgressMethod::LinearPrincipal);
        assert_close(p.progress_percentage, 50.0, 1e-12, "flat progress");
    }

    #[test]
    fn test_interest_split_is_linear() {
        let loan = flat_loan(60_000.0);
        let p = reconstruct_progress(&loan);
        let total = loan.total_interest();
        assert_close(p.interest_paid_approx, total / 2.0, 1e-6, "paid half");
        assert_close(
            p.interest_paid_approx + p.interest_remaining_approx,
            total,
            1e-6,
            "split sums to total",
        );
    }

    #[test]
    fn test_closed_loan_is_complete() {
        let loan = LoanSnapshot {
            status: LoanStatus::Closed,
            ..reducing_loan(40_000.0)
        };
        let p = reconstruct_progress(&loan);
        assert_eq!(p.periods_remaining, 0);
        assert_eq!(p.periods_elapsed, 24);
        assert_eq!(p.progress_percentage, 100.0);
        assert_eq!(p.interest_remaining_approx, 0.0);
        assert_eq!(p.method, ProgressMethod::FullyRepaid);
        assert_close(p.interest_paid_approx, loan.total_interest(), 1e-9, "all interest paid");
    }

    #[test]
    fn test_zero_balance_counts_as_repaid() {
        let p = reconstruct_progress(&reducing_loan(0.0));
        assert_eq!(p.periods_remaining, 0);
        assert_eq!(p.progress_percentage, 100.0);
    }

    #[test]
    fn test_infeasible_ratio_treated_as_unelapsed() {
        // 1000/month against 1200/month of interest
        let loan = LoanSnapshot {
            installment: 1_000.0,
            ..reducing_loan(120_000.0)
        };
        let p = reconstruct_progress(&loan);
        assert_eq!(p.periods_elapsed, 0);
        assert_eq!(p.method, ProgressMethod::InfeasibleRatio);
    }

    #[test]
    fn test_zero_rate_reducing_is_degenerate() {
        let loan = LoanSnapshot {
            interest_rate_pct: 0.0,
            installment: 5_000.0,
            ..reducing_loan(60_000.0)
        };
        let p = reconstruct_progress(&loan);
        assert_eq!(p.periods_elapsed, 24);
        assert_eq!(p.periods_remaining, 0);
        assert_eq!(p.method, ProgressMethod::Degenerate);
    }

    #[test]
    fn test_heuristic_fallback_is_flagged() {
        // 1 + r == 1.0 in f64, so the inversion is not finite
        let loan = LoanSnapshot {
            interest_rate_pct: 1e-14,
            installment: 10_000.0,
            outstanding_balance: 60_000.0,
            ..reducing_loan(60_000.0)
        };
        let p = reconstruct_progress(&loan);
        // half repaid => 12 linear periods, * 0.85 = 10.2 => 10
        assert_eq!(p.periods_elapsed, 10);
        assert_eq!(p.method, ProgressMethod::HeuristicFallback);
        assert!(p.method.is_heuristic());
    }

    #[test]
    fn test_balance_above_principal_is_clamped() {
        let p = reconstruct_progress(&flat_loan(150_000.0));
        assert_eq!(p.periods_elapsed, 0);
        assert_eq!(p.periods_remaining, 24);
    }

    #[test]
    fn test_flat_zero_principal_guard() {
        let loan = LoanSnapshot {
            principal: 0.0,
            ..flat_loan(1_000.0)
        };
        let p = reconstruct_progress(&loan);
        assert_eq!(p.periods_elapsed, 0);
    }

    #[test]
    fn test_reconstruct_is_idempotent() {
        let loan = reducing_loan(77_777.0);
        assert_eq!(reconstruct_progress(&loan), reconstruct_progress(&loan));
    }
}
