pub mod impact;
pub mod installment;
pub mod prepayment;
pub mod progress;
pub mod tips;

use clap::ValueEnum;
use serde_json::Value;

use emi_sim_core::advisory::AdvisoryPolicy;
use emi_sim_core::analysis::LoanAnalysisInput;
use emi_sim_core::simulation::PrepaymentMode;
use emi_sim_core::{InterestType, LoanSnapshot};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InterestTypeArg {
    Flat,
    Reducing,
}

impl From<InterestTypeArg> for InterestType {
    fn from(arg: InterestTypeArg) -> Self {
        match arg {
            InterestTypeArg::Flat => InterestType::Flat,
            InterestTypeArg::Reducing => InterestType::Reducing,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PrepaymentModeArg {
    /// Keep the installment, shorten the loan
    ReduceDuration,
    /// Keep the duration, lower the installment
    ReduceInstallment,
}

impl From<PrepaymentModeArg> for PrepaymentMode {
    fn from(arg: PrepaymentModeArg) -> Self {
        match arg {
            PrepaymentModeArg::ReduceDuration => PrepaymentMode::ReduceDuration,
            PrepaymentModeArg::ReduceInstallment => PrepaymentMode::ReduceInstallment,
        }
    }
}

/// Read a loan snapshot, given either bare or wrapped as `{ "loan": ... }`.
pub(crate) fn read_loan(
    path: Option<&str>,
    missing: &str,
) -> Result<LoanSnapshot, Box<dyn std::error::Error>> {
    let doc: Value = input::read_document(path, missing)?;
    Ok(serde_json::from_value(unwrap_loan(doc))?)
}

/// Read a loan (bare or wrapped) plus an optional policy override file.
pub(crate) fn read_analysis_input(
    path: Option<&str>,
    policy_path: Option<&str>,
    missing: &str,
) -> Result<LoanAnalysisInput, Box<dyn std::error::Error>> {
    let doc: Value = input::read_document(path, missing)?;
    let mut analysis: LoanAnalysisInput = if doc.get("loan").is_some() {
        serde_json::from_value(doc)?
    } else {
        LoanAnalysisInput {
            loan: serde_json::from_value(doc)?,
            policy: AdvisoryPolicy::default(),
        }
    };
    if let Some(path) = policy_path {
        analysis.policy = input::file::read_input(path)?;
    }
    Ok(analysis)
}

fn unwrap_loan(doc: Value) -> Value {
    match doc {
        Value::Object(mut map) if map.contains_key("loan") => {
            map.remove("loan").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Attach the snapshot a caller would save when applying a preview.
pub(crate) fn attach_updated_loan(
    mut envelope: Value,
    updated: &LoanSnapshot,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(Value::Object(result)) = envelope.get_mut("result") {
        result.insert("updated_loan".into(), serde_json::to_value(updated)?);
    }
    Ok(envelope)
}
