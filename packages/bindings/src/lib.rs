use napi::Result as NapiResult;
use napi_derive::napi;

use emi_sim_core::analysis::{
    self, ImpactInput, InstallmentInput, LoanAnalysisInput, PrepaymentInput,
};
use emi_sim_core::simulation;
use emi_sim_core::LoanSnapshot;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Installment
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_installment(input_json: String) -> NapiResult<String> {
    let input: InstallmentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_installment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Bare [`simulation::ProgressResult`] for a loan snapshot, no envelope.
#[napi]
pub fn reconstruct_progress(loan_json: String) -> NapiResult<String> {
    let loan: LoanSnapshot = serde_json::from_str(&loan_json).map_err(to_napi_error)?;
    let output = simulation::reconstruct_progress(&loan);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: LoanAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// What-if simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_impact(input_json: String) -> NapiResult<String> {
    let input: ImpactInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_impact(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_prepayment(input_json: String) -> NapiResult<String> {
    let input: PrepaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_prepayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Snapshot to persist once the user accepts an impact preview.
#[napi]
pub fn apply_impact(input_json: String) -> NapiResult<String> {
    let input: ImpactInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_impact(&input).map_err(to_napi_error)?;
    if !output.result.apply_allowed {
        return Err(napi::Error::from_reason(format!(
            "change cannot be applied: {}",
            output.result.notes.join("; ")
        )));
    }
    let updated = input.loan.with_impact(&output.result.impact);
    serde_json::to_string(&updated).map_err(to_napi_error)
}

/// Snapshot to persist once the user makes a previewed prepayment.
#[napi]
pub fn apply_prepayment(input_json: String) -> NapiResult<String> {
    let input: PrepaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = simulation::simulate_prepayment(&input.loan, input.amount, input.mode)
        .map_err(to_napi_error)?;
    let updated = input.loan.with_prepayment(&result);
    serde_json::to_string(&updated).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Advisory
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_tips(input_json: String) -> NapiResult<String> {
    let input: LoanAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_tips(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
