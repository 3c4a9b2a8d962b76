use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::loan::{Loan, LoanStatus};
use crate::types::*;
use crate::LoanResult;

/// Funded share of the commitment on a 0-100 scale. Zero commitment reads as 0.
pub fn utilization(loan: &Loan) -> Percent {
    ratio_or_zero(loan.funded_amount, loan.commitment_amount) * dec!(100)
}

/// Undrawn commitment, never negative.
pub fn available_to_fund(loan: &Loan) -> Money {
    (loan.commitment_amount - loan.funded_amount).max(Decimal::ZERO)
}

/// Commitment-weighted mean of `interest_rate`. `None` when there is
/// nothing to weight.
pub fn weighted_average_rate(loans: &[Loan]) -> Option<Rate> {
    let total_commitment: Money = loans.iter().map(|l| l.commitment_amount).sum();
    if total_commitment.is_zero() {
        return None;
    }
    let weighted: Decimal = loans
        .iter()
        .map(|l| l.interest_rate * l.commitment_amount)
        .sum();
    Some(weighted / total_commitment)
}

/// Per-loan figures for a detail view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: String,
    pub status: LoanStatus,
    pub commitment_amount: Money,
    pub funded_amount: Money,
    pub available_to_fund: Money,
    pub utilization: Percent,
    pub effective_rate: Rate,
    pub origination_fee: Money,
    pub exit_fee: Money,
}

/// Aggregates over a set of loans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub loan_count: usize,
    pub total_commitment: Money,
    pub total_funded: Money,
    pub total_available: Money,
    pub utilization: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_average_rate: Option<Rate>,
    pub loans_by_status: BTreeMap<String, usize>,
}

pub fn loan_summary(loan: &Loan) -> LoanResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    loan.validate()?;

    let mut warnings = Vec::new();
    let (effective_rate, rate_warning) = loan.effective_rate();
    warnings.extend(rate_warning);

    let output = LoanSummary {
        loan_id: loan.id.clone(),
        status: loan.status,
        commitment_amount: loan.commitment_amount,
        funded_amount: loan.funded_amount,
        available_to_fund: available_to_fund(loan),
        utilization: utilization(loan),
        effective_rate,
        origination_fee: loan.commitment_amount * loan.origination_fee_percent,
        exit_fee: loan.commitment_amount * loan.exit_fee_percent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan funding summary",
        &serde_json::json!({
            "loan_id": loan.id,
            "commitment_amount": loan.commitment_amount.to_string(),
            "rate_terms": loan.rate_terms,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Totals, utilization and weighted rate across every loan given.
pub fn summarize_portfolio(loans: &[Loan]) -> LoanResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    for loan in loans {
        loan.validate()?;
    }
    if loans.is_empty() {
        warnings.push("No loans in scope; weighted average rate undefined".into());
    }

    let total_commitment: Money = loans.iter().map(|l| l.commitment_amount).sum();
    let total_funded: Money = loans.iter().map(|l| l.funded_amount).sum();
    let total_available: Money = loans.iter().map(available_to_fund).sum();

    let mut loans_by_status = BTreeMap::new();
    for loan in loans {
        *loans_by_status.entry(loan.status.to_string()).or_insert(0) += 1;
    }

    let output = PortfolioSummary {
        loan_count: loans.len(),
        total_commitment,
        total_funded,
        total_available,
        utilization: ratio_or_zero(total_funded, total_commitment) * dec!(100),
        weighted_average_rate: weighted_average_rate(loans),
        loans_by_status,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Commitment-weighted portfolio aggregation",
        &serde_json::json!({ "loan_count": loans.len() }),
        warnings,
        elapsed,
        output,
    ))
}
