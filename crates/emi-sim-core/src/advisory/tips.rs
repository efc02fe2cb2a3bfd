//! Independent advisory rules over a reconstructed loan, ranked by priority.

use serde::{Deserialize, Serialize};

use super::AdvisoryPolicy;
use crate::amortization::{ceil_periods, floor_periods};
use crate::simulation::{fmt_money, fmt_months, reconstruct_progress, ProgressResult};
use crate::types::{LoanRole, LoanSnapshot, LoanStatus, Months};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    HighInterestWarning,
    Prepayment,
    ExtraInstallment,
    InstallmentIncrease,
}

/// Declaration order is rank order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub kind: TipKind,
    pub title: String,
    pub detail: String,
    pub impact_text: String,
    pub priority: TipPriority,
}

/// Tips for `loan` under the default [`AdvisoryPolicy`].
pub fn generate_tips(loan: &LoanSnapshot) -> Vec<Tip> {
    generate_tips_with_policy(loan, &AdvisoryPolicy::default())
}

/// Evaluate every rule against `loan` and return the tips that fire, stably
/// sorted high → low. Only active loans the owner has borrowed get tips.
pub fn generate_tips_with_policy(loan: &LoanSnapshot, policy: &AdvisoryPolicy) -> Vec<Tip> {
    if loan.status != LoanStatus::Active || loan.role != LoanRole::Borrowed {
        return Vec::new();
    }

    let progress = reconstruct_progress(loan);
    let mut tips: Vec<Tip> = [
        high_interest_tip(loan, &progress, policy),
        prepayment_tip(loan, &progress, policy),
        extra_installment_tip(&progress, policy),
        installment_increase_tip(loan, &progress, policy),
    ]
    .into_iter()
    .flatten()
    .collect();

    tips.sort_by_key(|tip| tip.priority);
    tips
}

fn high_interest_tip(
    loan: &LoanSnapshot,
    progress: &ProgressResult,
    policy: &AdvisoryPolicy,
) -> Option<Tip> {
    if !policy.is_high_interest(loan) {
        return None;
    }
    Some(Tip {
        kind: TipKind::HighInterestWarning,
        title: "High interest rate".into(),
        detail: format!(
            "At {}% a year this loan is above the {}% threshold; consider refinancing or paying it down first",
            loan.interest_rate_pct, policy.high_interest_rate_pct
        ),
        impact_text: format!(
            "About {} of interest still to pay",
            fmt_money(progress.interest_remaining_approx)
        ),
        priority: TipPriority::High,
    })
}

fn prepayment_tip(
    loan: &LoanSnapshot,
    progress: &ProgressResult,
    policy: &AdvisoryPolicy,
) -> Option<Tip> {
    let lump_sum = f64::from(policy.prepay_installments) * loan.installment;
    if progress.periods_remaining <= policy.prepay_min_remaining
        || loan.outstanding_balance <= lump_sum
        || loan.installment <= 0.0
    {
        return None;
    }
    let saved = floor_periods(lump_sum / loan.installment);
    if saved == 0 {
        return None;
    }
    Some(Tip {
        kind: TipKind::Prepayment,
        title: format!("Prepay {} installments", policy.prepay_installments),
        detail: format!(
            "A one-off prepayment of {} goes straight to principal",
            fmt_money(lump_sum)
        ),
        impact_text: format!("Closes about {} sooner", fmt_months(saved)),
        priority: TipPriority::Medium,
    })
}

fn extra_installment_tip(progress: &ProgressResult, policy: &AdvisoryPolicy) -> Option<Tip> {
    if progress.periods_remaining <= policy.extra_installment_min_remaining
        || policy.extra_installment_divisor == 0
    {
        return None;
    }
    let saved = progress.periods_remaining / policy.extra_installment_divisor;
    if saved == 0 {
        return None;
    }
    Some(Tip {
        kind: TipKind::ExtraInstallment,
        title: "Pay one extra installment a year".into(),
        detail: "One additional installment each year shortens the loan without changing your EMI"
            .into(),
        impact_text: format!("Closes about {} sooner", fmt_months(saved)),
        priority: TipPriority::Medium,
    })
}

/// Uses a quick estimate, `ceil(remaining / (1 + increase))`, rather than
/// the annuity inversion; it ignores how interest shifts with the faster
/// paydown and so slightly understates the saving on reducing loans.
fn installment_increase_tip(
    loan: &LoanSnapshot,
    progress: &ProgressResult,
    policy: &AdvisoryPolicy,
) -> Option<Tip> {
    if progress.periods_remaining <= policy.increase_min_remaining
        || loan.installment >= policy.increase_max_installment_share * loan.outstanding_balance
    {
        return None;
    }
    let scale = 1.0 + policy.installment_increase_pct / 100.0;
    if scale <= 1.0 {
        return None;
    }
    let estimated = ceil_periods(f64::from(progress.periods_remaining) / scale);
    let saved = progress.periods_remaining.saturating_sub(estimated);
    if saved == 0 {
        return None;
    }
    Some(Tip {
        kind: TipKind::InstallmentIncrease,
        title: format!("Raise your installment by {}%", policy.installment_increase_pct),
        detail: format!(
            "Paying {} instead of {} each month",
            fmt_money(loan.installment * scale),
            fmt_money(loan.installment)
        ),
        impact_text: format!("Closes about {} sooner", fmt_months(saved)),
        priority: TipPriority::Low,
    })
}
