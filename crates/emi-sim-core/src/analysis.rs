//! Enveloped entry points for API, CLI and bindings callers.
//!
//! Each wraps one engine operation in a [`ComputationOutput`] carrying the
//! methodology, the echoed input and a warning for every approximation the
//! figures rest on.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::advisory::{classify, generate_tips_with_policy, AdvisoryPolicy, LoanClassification, Tip, TipKind};
use crate::amortization::{compute_installment, minimum_installment};
use crate::simulation::{
    generate_impact_notes, generate_prepayment_notes, reconstruct_progress, simulate_impact,
    simulate_prepayment, validate_installment_change, ImpactChange, ImpactResult, PrepaymentMode,
    PrepaymentResult, ProgressMethod, ProgressResult,
};
use crate::types::{with_metadata, ComputationOutput, InterestType, LoanSnapshot, Money, Months, RatePct};
use crate::LoanEngineResult;

const LINEAR_SPLIT_NOTICE: &str =
    "Interest paid/remaining is a linear split of total interest; reducing-balance loans pay interest earlier than shown";

const FLAT_DURATION_NOTICE: &str =
    "Flat-rate duration applies the annual rate once to the remaining balance, undiscounted for elapsed time";

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentInput {
    pub principal: Money,
    pub interest_rate_pct: RatePct,
    pub tenure_months: Months,
    #[serde(default)]
    pub interest_type: InterestType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentOutput {
    pub installment: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    pub loan: LoanSnapshot,
    #[serde(default)]
    pub policy: AdvisoryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub progress: ProgressResult,
    pub minimum_installment: Money,
    pub classification: LoanClassification,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactInput {
    pub loan: LoanSnapshot,
    pub change: ImpactChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub impact: ImpactResult,
    pub notes: Vec<String>,
    /// The change is achievable and clears the minimum viable installment.
    pub apply_allowed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub loan: LoanSnapshot,
    pub amount: Money,
    pub mode: PrepaymentMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentAnalysis {
    pub prepayment: PrepaymentResult,
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn run_installment(
    input: &InstallmentInput,
) -> LoanEngineResult<ComputationOutput<InstallmentOutput>> {
    let start = Instant::now();

    let installment = compute_installment(
        input.principal,
        input.interest_rate_pct,
        input.tenure_months,
        input.interest_type,
    )?;
    let total_payable = installment * f64::from(input.tenure_months);
    let output = InstallmentOutput {
        installment,
        total_payable,
        total_interest: total_payable - input.principal,
    };

    let methodology = match input.interest_type {
        InterestType::Flat => "Flat-rate installment",
        InterestType::Reducing => "Reducing-balance annuity installment",
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, Vec::new(), elapsed, output))
}

/// Progress, minimum viable installment, classification and tips in one call.
pub fn analyze_loan(input: &LoanAnalysisInput) -> LoanEngineResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    input.loan.validate()?;

    let progress = reconstruct_progress(&input.loan);
    let tips = generate_tips_with_policy(&input.loan, &input.policy);
    let mut warnings = progress_warnings(&progress);
    warnings.extend(tip_warnings(&tips));

    let output = LoanAnalysis {
        minimum_installment: minimum_installment(&input.loan),
        classification: classify(&input.loan, &input.policy),
        progress,
        tips,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Progress reconstructed from balance snapshot",
        input,
        warnings,
        elapsed,
        output,
    ))
}

pub fn run_tips(input: &LoanAnalysisInput) -> LoanEngineResult<ComputationOutput<Vec<Tip>>> {
    let start = Instant::now();
    input.loan.validate()?;

    let tips = generate_tips_with_policy(&input.loan, &input.policy);
    let warnings = tip_warnings(&tips);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata("Rule-based repayment advice", input, warnings, elapsed, tips))
}

pub fn run_impact(input: &ImpactInput) -> LoanEngineResult<ComputationOutput<ImpactAnalysis>> {
    let start = Instant::now();

    let impact = simulate_impact(&input.loan, input.change)?;
    let apply_allowed = impact.achievable
        && match input.change {
            ImpactChange::InstallmentChange { new_installment } => {
                validate_installment_change(&input.loan, new_installment).is_ok()
            }
            ImpactChange::DurationChange { .. } => true,
        };

    let mut warnings = progress_warnings(&reconstruct_progress(&input.loan));
    if input.loan.interest_type == InterestType::Flat
        && matches!(input.change, ImpactChange::InstallmentChange { .. })
    {
        warnings.push(FLAT_DURATION_NOTICE.into());
    }
    if !impact.achievable {
        warnings.push("Requested installment cannot amortize the balance; change not achievable".into());
    }

    let methodology = match input.change {
        ImpactChange::InstallmentChange { .. } => "Installment change: duration by annuity inversion",
        ImpactChange::DurationChange { .. } => "Duration change: installment re-amortized",
    };
    let output = ImpactAnalysis {
        notes: generate_impact_notes(&impact),
        impact,
        apply_allowed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

pub fn run_prepayment(
    input: &PrepaymentInput,
) -> LoanEngineResult<ComputationOutput<PrepaymentAnalysis>> {
    let start = Instant::now();

    let prepayment = simulate_prepayment(&input.loan, input.amount, input.mode)?;

    let mut warnings = progress_warnings(&reconstruct_progress(&input.loan));
    if input.loan.interest_type == InterestType::Flat
        && input.mode == PrepaymentMode::ReduceDuration
        && !prepayment.fully_closed
    {
        warnings.push(FLAT_DURATION_NOTICE.into());
    }
    if prepayment.fully_closed {
        warnings.push("Interest saved on full closure is the linear remaining-interest estimate".into());
    }

    let methodology = match input.mode {
        PrepaymentMode::ReduceDuration => "Prepayment with installment held: duration re-solved",
        PrepaymentMode::ReduceInstallment => "Prepayment with duration held: installment re-amortized",
    };
    let output = PrepaymentAnalysis {
        notes: generate_prepayment_notes(&prepayment),
        prepayment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

fn progress_warnings(progress: &ProgressResult) -> Vec<String> {
    let mut warnings = Vec::new();
    match progress.method {
        ProgressMethod::FullyRepaid => {}
        ProgressMethod::LinearPrincipal | ProgressMethod::AnnuityInversion => {
            warnings.push(LINEAR_SPLIT_NOTICE.into());
        }
        ProgressMethod::InfeasibleRatio => {
            warnings.push(
                "Installment is too small to have amortized this balance; progress treated as not started"
                    .into(),
            );
        }
        ProgressMethod::Degenerate => {
            warnings.push(
                "Zero rate or zero installment on a reducing loan; progress treated as complete".into(),
            );
        }
        ProgressMethod::HeuristicFallback => {
            warnings.push(format!(
                "Elapsed periods are a heuristic: linear principal share scaled by {}",
                crate::simulation::progress::REDUCING_FALLBACK_FACTOR
            ));
            warnings.push(LINEAR_SPLIT_NOTICE.into());
        }
    }
    warnings
}

fn tip_warnings(tips: &[Tip]) -> Vec<String> {
    if tips.iter().any(|t| t.kind == TipKind::InstallmentIncrease) {
        vec!["Installment-increase saving is a quick estimate, not an annuity inversion".into()]
    } else {
        Vec::new()
    }
}
