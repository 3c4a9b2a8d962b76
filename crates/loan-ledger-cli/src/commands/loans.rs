use clap::Args;
use serde_json::Value;

use loan_ledger_core::lifecycle::{self, ActionBatch};
use loan_ledger_core::Loan;

use crate::input;

/// Arguments for commands that read a single JSON document
#[derive(Args)]
pub struct JsonInputArgs {
    /// Path to JSON input file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Funding summary for one loan record
pub fn run_loan_summary(args: JsonInputArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: Loan = input::require(args.input.as_deref(), "loan-summary")?;
    let result = lifecycle::loan_summary(&loan)?;
    Ok(serde_json::to_value(result)?)
}

/// Replay draw and payment actions against a stored account
pub fn run_draws(args: JsonInputArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let batch: ActionBatch = input::require(args.input.as_deref(), "draws")?;
    let result = lifecycle::apply_actions(&batch)?;
    Ok(serde_json::to_value(result)?)
}

/// Aggregate metrics over a JSON array of loans
pub fn run_portfolio(args: JsonInputArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans: Vec<Loan> = input::require(args.input.as_deref(), "portfolio")?;
    let result = lifecycle::summarize_portfolio(&loans)?;
    Ok(serde_json::to_value(result)?)
}
