use clap::Args;
use serde_json::Value;

use emi_sim_core::analysis::{self, InstallmentInput};

use super::InterestTypeArg;
use crate::input;

/// Arguments for installment calculation
#[derive(Args)]
pub struct InstallmentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<f64>,

    /// Annual interest rate in percent (e.g. 10.5)
    #[arg(long)]
    pub rate: Option<f64>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// How interest is charged
    #[arg(long, value_enum, default_value = "reducing")]
    pub interest_type: InterestTypeArg,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inst_input: InstallmentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if args.principal.is_some() || args.rate.is_some() || args.tenure.is_some() {
        InstallmentInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            interest_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            interest_type: args.interest_type.into(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--principal, --rate and --tenure (or --input) are required".into());
    };

    let result = analysis::run_installment(&inst_input)?;
    Ok(serde_json::to_value(result)?)
}
