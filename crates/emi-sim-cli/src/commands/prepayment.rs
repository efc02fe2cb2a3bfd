use clap::Args;
use serde_json::Value;
use tracing::debug;

use emi_sim_core::analysis::{self, PrepaymentInput};

use super::PrepaymentModeArg;
use crate::input;

#[derive(Args)]
pub struct PrepayArgs {
    /// Full prepayment document `{ loan, amount, mode }` (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan snapshot file, used with --amount
    #[arg(long)]
    pub loan: Option<String>,

    /// Lump sum paid towards principal
    #[arg(long)]
    pub amount: Option<f64>,

    /// What the prepayment should reduce
    #[arg(long, value_enum, default_value = "reduce-duration")]
    pub mode: PrepaymentModeArg,

    /// Also return the loan snapshot to save if the prepayment is made
    #[arg(long)]
    pub apply: bool,
}

pub fn run_prepay(args: PrepayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prepay_input: PrepaymentInput = if let Some(amount) = args.amount {
        PrepaymentInput {
            loan: super::read_loan(
                args.loan.as_deref().or(args.input.as_deref()),
                "--loan <loan.json> or stdin required with --amount",
            )?,
            amount,
            mode: args.mode.into(),
        }
    } else {
        input::read_document(
            args.input.as_deref(),
            "--amount (or a full --input document) required for prepayment",
        )?
    };
    debug!(amount = prepay_input.amount, mode = ?prepay_input.mode, "running prepayment preview");

    let result = analysis::run_prepayment(&prepay_input)?;
    if !args.apply {
        return Ok(serde_json::to_value(result)?);
    }
    let updated = prepay_input.loan.with_prepayment(&result.result.prepayment);
    super::attach_updated_loan(serde_json::to_value(result)?, &updated)
}
