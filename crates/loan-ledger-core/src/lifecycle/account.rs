use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::records::{Draw, DrawStatus, Payment, PaymentStatus};
use crate::amortization::{generate_schedule, AmortizationInput};
use crate::error::LoanError;
use crate::loan::{Loan, LoanStatus};
use crate::types::Money;
use crate::LoanResult;

/// A loan together with its draws and generated payments.
///
/// Every transition validates before it mutates, so a failed call leaves the
/// account exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAccount {
    pub loan: Loan,
    #[serde(default)]
    pub draws: Vec<Draw>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl LoanAccount {
    /// Start tracking a loan with no draws or payments.
    pub fn open(loan: Loan) -> LoanResult<Self> {
        loan.validate()?;
        Ok(LoanAccount {
            loan,
            draws: Vec::new(),
            payments: Vec::new(),
        })
    }

    /// Check an account rebuilt from stored records.
    pub fn validate(&self) -> LoanResult<()> {
        self.loan.validate()?;
        let mut numbers: Vec<u32> = self.draws.iter().map(|d| d.draw_number).collect();
        numbers.sort_unstable();
        if numbers.windows(2).any(|w| w[0] == w[1]) {
            return Err(LoanError::terms("draws", "Duplicate draw numbers"));
        }
        let funded_draws: Money = self
            .draws
            .iter()
            .filter(|d| d.status == DrawStatus::Funded)
            .map(|d| d.amount)
            .sum();
        if funded_draws != self.loan.funded_amount {
            return Err(LoanError::terms(
                "funded_amount",
                format!(
                    "Funded draws total {funded_draws} but funded_amount is {}",
                    self.loan.funded_amount
                ),
            ));
        }
        let expected = LoanStatus::from_funding(self.loan.funded_amount, self.loan.commitment_amount);
        let status_ok = match self.loan.status {
            LoanStatus::PaidOff => self.is_repaid(),
            status => status == expected,
        };
        if !status_ok {
            return Err(LoanError::terms(
                "status",
                format!("Status {} does not match funding (expected {expected})", self.loan.status),
            ));
        }
        if self.loan.funded_amount + self.pending_amount() > self.loan.commitment_amount {
            return Err(LoanError::ExceedsCommitment {
                requested: self.pending_amount(),
                available: self.loan.commitment_amount - self.loan.funded_amount,
            });
        }
        Ok(())
    }

    /// Sum of requested and approved draws.
    pub fn pending_amount(&self) -> Money {
        self.draws
            .iter()
            .filter(|d| d.is_pending())
            .map(|d| d.amount)
            .sum()
    }

    /// Commitment not yet funded nor reserved by a pending draw.
    pub fn available_to_request(&self) -> Money {
        (self.loan.commitment_amount - self.loan.funded_amount - self.pending_amount())
            .max(Decimal::ZERO)
    }

    pub fn draw(&self, draw_number: u32) -> Option<&Draw> {
        self.draws.iter().find(|d| d.draw_number == draw_number)
    }

    pub fn payment(&self, payment_number: u32) -> Option<&Payment> {
        self.payments
            .iter()
            .find(|p| p.payment_number == payment_number)
    }

    /// Reserve `amount` of the commitment as a new requested draw.
    pub fn request_draw(
        &mut self,
        amount: Money,
        requested_on: Option<NaiveDate>,
    ) -> LoanResult<&Draw> {
        self.ensure_open("request draw")?;
        if amount <= Decimal::ZERO {
            return Err(LoanError::terms("amount", "Draw amount must be positive"));
        }
        let available = self.loan.commitment_amount - self.loan.funded_amount - self.pending_amount();
        if amount > available {
            return Err(LoanError::ExceedsCommitment {
                requested: amount,
                available: available.max(Decimal::ZERO),
            });
        }

        let draw_number = self
            .draws
            .iter()
            .map(|d| d.draw_number)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| LoanError::terms("draw_number", "No draw numbers left on this loan"))?;
        debug!(loan = %self.loan.id, draw_number, %amount, "draw requested");
        self.draws.push(Draw {
            loan_id: self.loan.id.clone(),
            draw_number,
            amount,
            status: DrawStatus::Requested,
            requested_on,
            approved_on: None,
            funded_on: None,
        });
        Ok(&self.draws[self.draws.len() - 1])
    }

    /// `requested → approved`. No funds move.
    pub fn approve_draw(
        &mut self,
        draw_number: u32,
        approved_on: Option<NaiveDate>,
    ) -> LoanResult<&Draw> {
        self.ensure_open("approve draw")?;
        let idx = self.advance_check(draw_number, DrawStatus::Approved)?;
        let draw = &mut self.draws[idx];
        draw.status = DrawStatus::Approved;
        draw.approved_on = approved_on;
        debug!(loan = %self.loan.id, draw_number, "draw approved");
        Ok(&self.draws[idx])
    }

    /// `approved → funded`. Adds the draw to the funded amount and moves the
    /// loan to `partially_drawn` or `fully_drawn`.
    pub fn fund_draw(&mut self, draw_number: u32, funded_on: Option<NaiveDate>) -> LoanResult<&Draw> {
        self.ensure_open("fund draw")?;
        let idx = self.advance_check(draw_number, DrawStatus::Funded)?;

        let amount = self.draws[idx].amount;
        let funded = self.loan.funded_amount + amount;
        if funded > self.loan.commitment_amount {
            return Err(LoanError::ExceedsCommitment {
                requested: amount,
                available: self.loan.commitment_amount - self.loan.funded_amount,
            });
        }

        let draw = &mut self.draws[idx];
        draw.status = DrawStatus::Funded;
        draw.funded_on = funded_on;
        self.loan.funded_amount = funded;

        let status = LoanStatus::from_funding(funded, self.loan.commitment_amount);
        if status != self.loan.status {
            info!(loan = %self.loan.id, from = %self.loan.status, to = %status, "loan status changed");
        }
        self.loan.status = status;
        Ok(&self.draws[idx])
    }

    /// Regenerate every payment record from the amortization engine.
    ///
    /// Principal is the funded amount at the loan's effective rate, rounded to
    /// cents. Refused once any payment has been paid.
    pub fn schedule_payments(&mut self) -> LoanResult<&[Payment]> {
        if let Some(paid) = self.payments.iter().find(|p| p.status == PaymentStatus::Paid) {
            return Err(LoanError::transition(
                format!("payment schedule for loan {}", self.loan.id),
                format!("payment #{} paid", paid.payment_number),
                "regenerated",
            ));
        }

        let (rate, warning) = self.loan.effective_rate();
        if let Some(w) = warning {
            warn!("{w}");
        }

        let input = AmortizationInput {
            principal: self.loan.funded_amount,
            annual_rate: rate,
            term_months: self.loan.term_months,
            io_period_months: self.loan.io_period_months,
            amortization_months: self.loan.amortization_months,
            round_to_cents: true,
        };
        let rows = generate_schedule(&input)?;

        let mut payments = Vec::with_capacity(rows.len());
        for row in &rows {
            let due_date = match self.loan.first_payment_date {
                Some(first) => Some(first.checked_add_months(Months::new(row.month - 1)).ok_or_else(
                    || LoanError::terms("first_payment_date", "Due date out of range"),
                )?),
                None => None,
            };
            payments.push(Payment::from_row(&self.loan.id, row, due_date));
        }

        debug!(loan = %self.loan.id, count = payments.len(), "payments scheduled");
        self.payments = payments;
        Ok(&self.payments)
    }

    /// `scheduled → paid`. Once the last payment is paid and the schedule ends
    /// at zero, the loan is paid off.
    pub fn mark_payment_paid(
        &mut self,
        payment_number: u32,
        paid_on: Option<NaiveDate>,
    ) -> LoanResult<&Payment> {
        let idx = self
            .payments
            .iter()
            .position(|p| p.payment_number == payment_number)
            .ok_or_else(|| LoanError::UnknownRecord {
                record: format!("payment on loan {}", self.loan.id),
                id: payment_number.to_string(),
            })?;

        let payment = &mut self.payments[idx];
        if payment.status == PaymentStatus::Paid {
            return Err(LoanError::transition(
                format!("payment #{payment_number} on loan {}", self.loan.id),
                PaymentStatus::Paid,
                PaymentStatus::Paid,
            ));
        }
        payment.status = PaymentStatus::Paid;
        payment.paid_on = paid_on;

        if self.is_repaid() {
            info!(loan = %self.loan.id, "loan paid off");
            self.loan.status = LoanStatus::PaidOff;
        }
        Ok(&self.payments[idx])
    }

    fn is_repaid(&self) -> bool {
        self.loan.funded_amount > Decimal::ZERO
            && !self.payments.is_empty()
            && self.payments.iter().all(|p| p.status == PaymentStatus::Paid)
            && self
                .payments
                .last()
                .is_some_and(|p| p.ending_balance.is_zero())
    }

    fn ensure_open(&self, action: &str) -> LoanResult<()> {
        if self.loan.status == LoanStatus::PaidOff {
            return Err(LoanError::transition(
                format!("loan {}", self.loan.id),
                LoanStatus::PaidOff,
                action,
            ));
        }
        Ok(())
    }

    /// Index of the draw if it may advance to `target`.
    fn advance_check(&self, draw_number: u32, target: DrawStatus) -> LoanResult<usize> {
        let idx = self
            .draws
            .iter()
            .position(|d| d.draw_number == draw_number)
            .ok_or_else(|| LoanError::UnknownRecord {
                record: format!("draw on loan {}", self.loan.id),
                id: draw_number.to_string(),
            })?;

        let current = self.draws[idx].status;
        if current.next() != Some(target) {
            return Err(LoanError::transition(
                format!("draw #{draw_number} on loan {}", self.loan.id),
                current,
                target,
            ));
        }
        Ok(idx)
    }
}
