//! Lump-sum prepayment: apply an amount against the outstanding balance and
//! either keep the EMI (finish sooner) or keep the end date (pay less).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::progress::reconstruct_progress;
use super::{fmt_money, fmt_months, payoff_date, period_shift, InterestDelta};
use crate::amortization::{ceil_periods, compute_installment, periods_to_amortize, Inversion};
use crate::error::LoanEngineError;
use crate::types::{LoanSnapshot, Money, Months};
use crate::LoanEngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentMode {
    /// Keep the installment; the loan ends earlier.
    ReduceDuration,
    /// Keep the remaining periods; the installment drops.
    ReduceInstallment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub mode: PrepaymentMode,
    pub amount: Money,
    /// The amount clears the whole balance.
    pub fully_closed: bool,
    pub periods_elapsed: Months,
    pub current_remaining_periods: Months,
    pub previous_installment: Money,
    pub new_installment: Money,
    pub new_remaining_periods: Months,
    pub total_payable_before: Money,
    /// Includes the prepaid amount itself.
    pub total_payable_after: Money,
    pub interest_saved: Money,
    /// Always 0 in [`PrepaymentMode::ReduceInstallment`].
    pub periods_saved: Months,
    pub new_end_date: NaiveDate,
}

/// Preview prepaying `amount` against `loan` in the chosen `mode`.
///
/// Requires `0 < amount <= outstanding_balance`. Paying the whole balance
/// closes the loan and credits the remaining interest estimate as saved.
/// Durations round up to whole months, so `interest_saved` only grows with
/// `amount` in whole-installment steps; between steps it can dip.
pub fn simulate_prepayment(
    loan: &LoanSnapshot,
    amount: Money,
    mode: PrepaymentMode,
) -> LoanEngineResult<PrepaymentResult> {
    loan.validate()?;
    if loan.is_repaid() {
        return Err(LoanEngineError::validation(
            "status",
            "Loan is already repaid; nothing to prepay",
        ));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LoanEngineError::validation(
            "amount",
            "Prepayment amount must be greater than zero",
        ));
    }
    if amount > loan.outstanding_balance {
        return Err(LoanEngineError::validation(
            "amount",
            format!(
                "Prepayment {} exceeds the outstanding balance {}",
                fmt_money(amount),
                fmt_money(loan.outstanding_balance)
            ),
        ));
    }
    debug!(amount, ?mode, loan_id = %loan.id, "simulating prepayment");

    let progress = reconstruct_progress(loan);
    let elapsed = progress.periods_elapsed;
    let current = progress.periods_remaining;
    let total_payable_before = loan.installment * f64::from(current);
    let remaining = loan.outstanding_balance - amount;

    if remaining <= 0.0 {
        return Ok(PrepaymentResult {
            mode,
            amount,
            fully_closed: true,
            periods_elapsed: elapsed,
            current_remaining_periods: current,
            previous_installment: loan.installment,
            new_installment: 0.0,
            new_remaining_periods: 0,
            total_payable_before,
            total_payable_after: amount,
            interest_saved: progress.interest_remaining_approx,
            periods_saved: current,
            new_end_date: payoff_date(loan.start_date, elapsed, 0)?,
        });
    }

    let (new_installment, new_periods) = match mode {
        PrepaymentMode::ReduceDuration => {
            let n = match periods_to_amortize(
                remaining,
                loan.interest_rate_pct,
                loan.installment,
                loan.interest_type,
            ) {
                Inversion::Periods(n) => n,
                Inversion::Indeterminate => {
                    warn!(
                        rate_pct = loan.interest_rate_pct,
                        "annuity inversion not finite; ignoring interest in duration"
                    );
                    ceil_periods(remaining / loan.installment)
                }
                // The current installment never cleared the old balance either.
                Inversion::Infeasible => current,
            };
            (loan.installment, n)
        }
        PrepaymentMode::ReduceInstallment => {
            // A degenerate reconstruction can leave zero periods; spread over one.
            let n = current.max(1);
            let installment =
                compute_installment(remaining, loan.interest_rate_pct, n, loan.interest_type)?;
            (installment, n)
        }
    };

    let total_payable_after = amount + new_installment * f64::from(new_periods);
    let delta = InterestDelta::between(total_payable_before, total_payable_after);
    let periods_saved = match mode {
        PrepaymentMode::ReduceDuration => period_shift(current, new_periods).0,
        PrepaymentMode::ReduceInstallment => 0,
    };

    Ok(PrepaymentResult {
        mode,
        amount,
        fully_closed: false,
        periods_elapsed: elapsed,
        current_remaining_periods: current,
        previous_installment: loan.installment,
        new_installment,
        new_remaining_periods: new_periods,
        total_payable_before,
        total_payable_after,
        interest_saved: delta.saved,
        periods_saved,
        new_end_date: payoff_date(loan.start_date, elapsed, new_periods)?,
    })
}

/// Human-readable summary of a prepayment preview.
pub fn generate_prepayment_notes(result: &PrepaymentResult) -> Vec<String> {
    let mut notes = Vec::new();
    if result.fully_closed {
        notes.push(format!(
            "Prepaying {} closes the loan on {}",
            fmt_money(result.amount),
            result.new_end_date
        ));
        if result.interest_saved > 0.0 {
            notes.push(format!(
                "You save about {} in remaining interest",
                fmt_money(result.interest_saved)
            ));
        }
        return notes;
    }

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
    if result.mode == PrepaymentMode::ReduceInstallment
        && result.new_installment < result.previous_installment
    {
        notes.push(format!(
            "Installment drops from {} to {}",
            fmt_money(result.previous_installment),
            fmt_money(result.new_installment)
        ));
    }
    notes
}
