use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_ledger_core::amortization::{self, AmortizationInput};

use crate::input;

/// Arguments for building an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Opening principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate as a decimal fraction (0.085 = 8.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Total term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Interest-only months at the start of the term
    #[arg(long, default_value_t = 0)]
    pub io_months: u32,

    /// Months the level payment is sized over (balloon when longer than the term)
    #[arg(long)]
    pub amortization_months: Option<u32>,

    /// Round each row to cents
    #[arg(long)]
    pub round: bool,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = if let Some(from_json) = input::load(args.input.as_deref())? {
        from_json
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        let term = args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;
        AmortizationInput {
            principal,
            annual_rate: rate,
            term_months: term,
            io_period_months: args.io_months,
            amortization_months: args.amortization_months,
            round_to_cents: args.round,
        }
    };

    let result = amortization::build_amortization(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}
