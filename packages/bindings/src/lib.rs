use napi::Result as NapiResult;
use napi_derive::napi;

use loan_ledger_core::amortization::{self, AmortizationInput};
use loan_ledger_core::lifecycle::{self, ActionBatch};
use loan_ledger_core::Loan;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ScheduleBindingInput {
    principal: rust_decimal::Decimal,
    annual_rate: rust_decimal::Decimal,
    term_months: u32,
    #[serde(default)]
    io_period_months: u32,
}

/// Bare schedule rows, for views that only need the table.
#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = amortization::compute_schedule(
        input.principal,
        input.annual_rate,
        input.term_months,
        input.io_period_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn build_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::build_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan lifecycle
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_summary(input_json: String) -> NapiResult<String> {
    let loan: Loan = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::loan_summary(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn portfolio_summary(input_json: String) -> NapiResult<String> {
    let loans: Vec<Loan> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::summarize_portfolio(&loans).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Apply draw/payment actions to a stored account and return the new account.
/// Nothing is returned but the error when any action is rejected.
#[napi]
pub fn apply_draw_actions(input_json: String) -> NapiResult<String> {
    let batch: ActionBatch = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::apply_actions(&batch).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
