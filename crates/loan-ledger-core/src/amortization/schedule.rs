use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoanError;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{Money, Rate};
use crate::LoanResult;

/// One month of debt service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Balance after this month's principal.
    pub balance: Money,
}

/// Loan terms accepted by the schedule builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    #[serde(default)]
    pub io_period_months: u32,
    /// Sizing horizon for the level payment. Longer than the post-I/O term
    /// leaves a balloon in the final month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortization_months: Option<u32>,
    /// Round each row to cents; the final row still absorbs the residual.
    #[serde(default)]
    pub round_to_cents: bool,
}

impl AmortizationInput {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32, io_period_months: u32) -> Self {
        AmortizationInput {
            principal,
            annual_rate,
            term_months,
            io_period_months,
            amortization_months: None,
            round_to_cents: false,
        }
    }

    pub fn validate(&self) -> LoanResult<()> {
        if self.principal < Decimal::ZERO {
            return Err(LoanError::terms("principal", "Principal cannot be negative"));
        }
        if self.annual_rate < Decimal::ZERO || self.annual_rate >= Decimal::ONE {
            return Err(LoanError::terms(
                "annual_rate",
                "Annual rate must be a fraction in [0, 1)",
            ));
        }
        if self.term_months == 0 {
            return Err(LoanError::terms("term_months", "Term must be at least 1 month"));
        }
        if self.io_period_months > self.term_months {
            return Err(LoanError::terms(
                "io_period_months",
                "Interest-only period cannot exceed the term",
            ));
        }
        if let Some(amort) = self.amortization_months {
            if amort < self.amortizing_months() {
                return Err(LoanError::terms(
                    "amortization_months",
                    "Amortization cannot be shorter than the post interest-only term",
                ));
            }
        }
        Ok(())
    }

    /// Months after the interest-only period.
    pub fn amortizing_months(&self) -> u32 {
        self.term_months.saturating_sub(self.io_period_months)
    }
}

/// Month-by-month schedule with an optional interest-only period.
///
/// Rows 1..=`io_period_months` pay interest only. The remaining months pay a
/// level payment sized once from the balance at the start of amortization.
/// The final row takes whatever balance is left so the schedule ends at zero.
/// A loan that is interest-only for its whole term keeps its full balance.
pub fn compute_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    io_period_months: u32,
) -> LoanResult<Vec<ScheduleRow>> {
    generate_schedule(&AmortizationInput::new(
        principal,
        annual_rate,
        term_months,
        io_period_months,
    ))
}

/// Schedule for the full set of builder options.
pub fn generate_schedule(input: &AmortizationInput) -> LoanResult<Vec<ScheduleRow>> {
    input.validate()?;

    let rate = monthly_rate(input.annual_rate);
    let round = |v: Decimal| {
        if input.round_to_cents {
            v.round_dp(2)
        } else {
            v
        }
    };

    let mut rows = Vec::with_capacity(input.term_months as usize);
    let mut balance = input.principal;

    for month in 1..=input.io_period_months {
        let interest = round(balance * rate);
        rows.push(ScheduleRow {
            month,
            payment: interest,
            principal: Decimal::ZERO,
            interest,
            balance,
        });
    }

    let amortizing = input.amortizing_months();
    if amortizing == 0 {
        debug!(term = input.term_months, "interest-only for full term");
        return Ok(rows);
    }

    let sizing = input.amortization_months.unwrap_or(amortizing);
    let payment = round(level_payment(balance, rate, sizing)?);
    debug!(%payment, amortizing, sizing, "level payment sized");

    for month in (input.io_period_months + 1)..=input.term_months {
        let interest = round(balance * rate);
        let scheduled = (payment - interest).max(Decimal::ZERO);

        let row = if month == input.term_months || scheduled >= balance {
            ScheduleRow {
                month,
                payment: balance + interest,
                principal: balance,
                interest,
                balance: Decimal::ZERO,
            }
        } else {
            ScheduleRow {
                month,
                payment: payment.max(interest),
                principal: scheduled,
                interest,
                balance: balance - scheduled,
            }
        };
        balance = row.balance;
        rows.push(row);
    }

    Ok(rows)
}
