//! Progress reconstruction and what-if simulation over a [`LoanSnapshot`].
//!
//! Every function here is pure: it reads the snapshot it is given and returns
//! a fresh value. Applying a simulated result is the caller's job; the
//! `with_*` builders only produce the snapshot a caller would persist.

pub mod impact;
pub mod prepayment;
pub mod progress;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{add_months, present, LoanSnapshot, LoanStatus, Money, Months};
use crate::LoanEngineResult;

pub use impact::{
    generate_impact_notes, simulate_impact, validate_installment_change, ImpactChange,
    ImpactResult,
};
pub use prepayment::{
    generate_prepayment_notes, simulate_prepayment, PrepaymentMode, PrepaymentResult,
};
pub use progress::{reconstruct_progress, ProgressMethod, ProgressResult};

/// Difference in total payable between the current plan and a simulated one,
/// split into two non-negative, mutually exclusive figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InterestDelta {
    pub saved: Money,
    pub increased: Money,
}

impl InterestDelta {
    pub(crate) fn between(total_before: Money, total_after: Money) -> Self {
        let delta = total_before - total_after;
        InterestDelta {
            saved: delta.max(0.0),
            increased: (-delta).max(0.0),
        }
    }
}

/// `(periods_saved, periods_added)` relative to the current remaining periods.
pub(crate) fn period_shift(current: Months, new: Months) -> (Months, Months) {
    (current.saturating_sub(new), new.saturating_sub(current))
}

/// Payoff date after `elapsed` months already served and `remaining` to go.
pub(crate) fn payoff_date(
    start: NaiveDate,
    elapsed: Months,
    remaining: Months,
) -> LoanEngineResult<NaiveDate> {
    add_months(start, elapsed.saturating_add(remaining))
}

pub(crate) fn fmt_money(amount: Money) -> Decimal {
    present(amount)
}

pub(crate) fn fmt_months(n: Months) -> String {
    if n == 1 {
        "1 month".to_string()
    } else {
        format!("{n} months")
    }
}

impl LoanSnapshot {
    /// The snapshot a caller would persist to adopt `impact`.
    ///
    /// An unachievable impact leaves the loan as it is.
    pub fn with_impact(&self, impact: &ImpactResult) -> LoanSnapshot {
        if !impact.achievable {
            return self.clone();
        }
        LoanSnapshot {
            installment: impact.new_installment,
            original_tenure_months: impact
                .periods_elapsed
                .saturating_add(impact.new_remaining_periods),
            ..self.clone()
        }
    }

    /// The snapshot a caller would persist after making `prepayment`.
    pub fn with_prepayment(&self, prepayment: &PrepaymentResult) -> LoanSnapshot {
        let outstanding_balance = (self.outstanding_balance - prepayment.amount).max(0.0);
        if prepayment.fully_closed {
            return LoanSnapshot {
                outstanding_balance,
                status: LoanStatus::Closed,
                ..self.clone()
            };
        }
        LoanSnapshot {
            outstanding_balance,
            installment: prepayment.new_installment,
            original_tenure_months: prepayment
                .periods_elapsed
                .saturating_add(prepayment.new_remaining_periods),
            ..self.clone()
        }
    }
}
