use clap::Args;
use serde_json::Value;

use emi_sim_core::analysis;

#[derive(Args)]
pub struct ProgressArgs {
    /// Loan snapshot file (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Advisory threshold overrides (JSON or YAML)
    #[arg(long)]
    pub policy: Option<String>,
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input = super::read_analysis_input(
        args.input.as_deref(),
        args.policy.as_deref(),
        "--input <loan.json> or stdin required for progress",
    )?;
    let result = analysis::analyze_loan(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
