//! Rule-based repayment tips and loan classification.

pub mod classification;
pub mod tips;

use serde::{Deserialize, Serialize};

use crate::types::{Months, RatePct};

pub use classification::{classify, is_high_interest, is_interest_heavy, is_long_tenure, LoanClassification};
pub use tips::{generate_tips, generate_tips_with_policy, Tip, TipKind, TipPriority};

/// Thresholds behind every advisory rule. `Default` holds the shipped values;
/// any field can be overridden from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryPolicy {
    /// Annual rate above which a loan is flagged as expensive.
    pub high_interest_rate_pct: RatePct,
    /// Remaining periods a loan needs before the prepayment tip applies.
    pub prepay_min_remaining: Months,
    /// Installments suggested as a lump-sum prepayment.
    pub prepay_installments: u32,
    /// Remaining periods needed before the extra-installment tip applies.
    pub extra_installment_min_remaining: Months,
    /// One extra installment a year saves roughly `remaining / divisor` periods.
    pub extra_installment_divisor: u32,
    /// The increase tip applies when the installment is below this share of
    /// the outstanding balance.
    pub increase_max_installment_share: f64,
    /// Suggested installment increase, in percent.
    pub installment_increase_pct: f64,
    /// Remaining periods a loan needs before the increase tip applies.
    pub increase_min_remaining: Months,
    /// Remaining periods above which a loan counts as long.
    pub long_tenure_months: Months,
    /// Total interest over principal above which a loan is interest-heavy.
    pub interest_heavy_ratio: f64,
}

impl Default for AdvisoryPolicy {
    fn default() -> Self {
        AdvisoryPolicy {
            high_interest_rate_pct: 15.0,
            prepay_min_remaining: 6,
            prepay_installments: 3,
            extra_installment_min_remaining: 12,
            extra_installment_divisor: 13,
            increase_max_installment_share: 0.1,
            installment_increase_pct: 20.0,
            increase_min_remaining: 6,
            long_tenure_months: 24,
            interest_heavy_ratio: 0.5,
        }
    }
}
