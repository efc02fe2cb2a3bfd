use clap::Args;
use serde_json::Value;
use tracing::debug;

use emi_sim_core::analysis::{self, ImpactInput};
use emi_sim_core::simulation::ImpactChange;

use crate::input;

#[derive(Args)]
pub struct ImpactArgs {
    /// Full impact document `{ loan, change }` (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan snapshot file, used with --new-installment or --new-remaining-periods
    #[arg(long)]
    pub loan: Option<String>,

    /// Proposed monthly installment
    #[arg(long, conflicts_with = "new_remaining_periods")]
    pub new_installment: Option<f64>,

    /// Proposed number of remaining months
    #[arg(long)]
    pub new_remaining_periods: Option<u32>,

    /// Also return the loan snapshot to save if the change is applied
    #[arg(long)]
    pub apply: bool,
}

pub fn run_impact(args: ImpactArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let change = match (args.new_installment, args.new_remaining_periods) {
        (Some(new_installment), _) => Some(ImpactChange::InstallmentChange { new_installment }),
        (None, Some(new_remaining_periods)) => Some(ImpactChange::DurationChange {
            new_remaining_periods,
        }),
        (None, None) => None,
    };

    let impact_input: ImpactInput = match change {
        Some(change) => ImpactInput {
            loan: super::read_loan(
                args.loan.as_deref().or(args.input.as_deref()),
                "--loan <loan.json> or stdin required with a proposed change",
            )?,
            change,
        },
        None => input::read_document(
            args.input.as_deref(),
            "--new-installment or --new-remaining-periods (or a full --input document) required",
        )?,
    };
    debug!(change = ?impact_input.change, "running impact preview");

    let result = analysis::run_impact(&impact_input)?;
    if !args.apply {
        return Ok(serde_json::to_value(result)?);
    }
    if !result.result.apply_allowed {
        return Err(format!(
            "change cannot be applied: {}",
            result.result.notes.join("; ")
        )
        .into());
    }
    let updated = impact_input.loan.with_impact(&result.result.impact);
    super::attach_updated_loan(serde_json::to_value(result)?, &updated)
}
