use serde::{Deserialize, Serialize};

use super::AdvisoryPolicy;
use crate::simulation::reconstruct_progress;
use crate::types::LoanSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanClassification {
    pub high_interest: bool,
    pub long_tenure: bool,
    pub interest_heavy: bool,
}

impl AdvisoryPolicy {
    pub fn is_high_interest(&self, loan: &LoanSnapshot) -> bool {
        loan.interest_rate_pct > self.high_interest_rate_pct
    }

    /// More than `long_tenure_months` left, by reconstructed progress.
    pub fn is_long_tenure(&self, loan: &LoanSnapshot) -> bool {
        reconstruct_progress(loan).periods_remaining > self.long_tenure_months
    }

    /// Total interest over the loan exceeds `interest_heavy_ratio` of principal.
    pub fn is_interest_heavy(&self, loan: &LoanSnapshot) -> bool {
        loan.principal > 0.0 && loan.total_interest() / loan.principal > self.interest_heavy_ratio
    }
}

pub fn is_high_interest(loan: &LoanSnapshot) -> bool {
    AdvisoryPolicy::default().is_high_interest(loan)
}

pub fn is_long_tenure(loan: &LoanSnapshot) -> bool {
    AdvisoryPolicy::default().is_long_tenure(loan)
}

pub fn is_interest_heavy(loan: &LoanSnapshot) -> bool {
    AdvisoryPolicy::default().is_interest_heavy(loan)
}

pub fn classify(loan: &LoanSnapshot, policy: &AdvisoryPolicy) -> LoanClassification {
    LoanClassification {
        high_interest: policy.is_high_interest(loan),
        long_tenure: policy.is_long_tenure(loan),
        interest_heavy: policy.is_interest_heavy(loan),
    }
}
