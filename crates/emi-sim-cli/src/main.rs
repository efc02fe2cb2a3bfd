mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::impact::ImpactArgs;
use commands::installment::InstallmentArgs;
use commands::prepayment::PrepayArgs;
use commands::progress::ProgressArgs;
use commands::tips::TipsArgs;

/// Loan installment and what-if calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan installment and what-if calculations",
    long_about = "Compute installments for flat and reducing-balance loans, infer repayment \
                  progress from an outstanding balance, preview installment, duration and \
                  prepayment changes, and list repayment tips. Loan snapshots are read as \
                  JSON or YAML from --input/--loan or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the level installment for a new loan
    Installment(InstallmentArgs),
    /// Reconstruct repayment progress from a loan snapshot
    Progress(ProgressArgs),
    /// Preview a new installment or a new remaining duration
    Impact(ImpactArgs),
    /// Preview a partial or full prepayment
    Prepay(PrepayArgs),
    /// List repayment tips for a loan
    Tips(TipsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    // Diagnostics go to stderr so piped output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Installment(args) => commands::installment::run_installment(args),
        Commands::Progress(args) => commands::progress::run_progress(args),
        Commands::Impact(args) => commands::impact::run_impact(args),
        Commands::Prepay(args) => commands::prepayment::run_prepay(args),
        Commands::Tips(args) => commands::tips::run_tips(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
