use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LoanEngineError;
use crate::LoanEngineResult;

/// Monetary amounts. Plain `f64` in computation; rounded only by [`present`].
pub type Money = f64;

/// Annual interest rate as a percentage (10.5 = 10.5% p.a.). Never as a decimal.
pub type RatePct = f64;

/// Whole months. The engine has no finer time unit.
pub type Months = u32;

/// Divisor turning an annual percentage into a monthly fraction.
pub const MONTHLY_RATE_DIVISOR: f64 = 1200.0;

/// How interest accrues over the life of the loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    /// Interest on the original principal for the whole tenure.
    Flat,
    /// Interest each month on the balance still outstanding.
    #[default]
    Reducing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Active,
    Closed,
}

/// Which side of the loan the tracker's owner is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanRole {
    #[default]
    Borrowed,
    Lent,
}

/// A single point-in-time view of a loan, as hydrated by the storage layer.
///
/// There is no payment ledger behind it: everything the engine reports about
/// progress is inferred from `outstanding_balance` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    /// Storage key. Ignored by every computation.
    #[serde(default)]
    pub id: String,
    pub principal: Money,
    pub interest_rate_pct: RatePct,
    #[serde(default)]
    pub interest_type: InterestType,
    pub original_tenure_months: Months,
    /// Current EMI.
    pub installment: Money,
    pub outstanding_balance: Money,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub role: LoanRole,
}

impl LoanSnapshot {
    /// Reject snapshots no formula can be applied to.
    ///
    /// A balance above the principal is tolerated (stale data is common), but
    /// negative or non-finite figures and a zero tenure are not.
    pub fn validate(&self) -> LoanEngineResult<()> {
        check_amount("principal", self.principal)?;
        check_amount("interest_rate_pct", self.interest_rate_pct)?;
        check_amount("installment", self.installment)?;
        check_amount("outstanding_balance", self.outstanding_balance)?;
        if self.original_tenure_months < 1 {
            return Err(LoanEngineError::invalid(
                "original_tenure_months",
                "Tenure must be at least one month",
            ));
        }
        Ok(())
    }

    pub fn monthly_rate(&self) -> f64 {
        self.interest_rate_pct / MONTHLY_RATE_DIVISOR
    }

    /// Installment times original tenure.
    pub fn total_payable(&self) -> Money {
        self.installment * f64::from(self.original_tenure_months)
    }

    /// Interest over the whole loan implied by the current installment.
    pub fn total_interest(&self) -> Money {
        self.total_payable() - self.principal
    }

    /// Closed by status, or nothing left to repay.
    pub fn is_repaid(&self) -> bool {
        self.status == LoanStatus::Closed || self.outstanding_balance <= 0.0
    }
}

fn check_amount(field: &str, value: f64) -> LoanEngineResult<()> {
    if !value.is_finite() {
        return Err(LoanEngineError::invalid(field, "Value must be finite"));
    }
    if value < 0.0 {
        return Err(LoanEngineError::invalid(field, "Value cannot be negative"));
    }
    Ok(())
}

/// `start + months`, clamped to month end the way chrono does it.
pub fn add_months(start: NaiveDate, months: Months) -> LoanEngineResult<NaiveDate> {
    start
        .checked_add_months(chrono::Months::new(months))
        .ok_or_else(|| {
            LoanEngineError::DateOverflow(format!("{start} + {months} months is out of range"))
        })
}

/// Round a computed amount to cents for display.
///
/// This is the only place currency is rounded; intermediate values stay
/// unrounded so the three simulation modes stay consistent with each other.
pub fn present(amount: Money) -> Decimal {
    let mut cents = Decimal::from_f64_retain(amount)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    cents
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64".to_string(),
        },
    }
}
