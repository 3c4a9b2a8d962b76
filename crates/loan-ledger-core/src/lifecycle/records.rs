//! Draw and payment records tracked against a loan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amortization::ScheduleRow;
use crate::types::Money;

/// Draw status. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStatus {
    Requested,
    Approved,
    Funded,
}

impl DrawStatus {
    /// The single status this one may advance to.
    pub fn next(self) -> Option<DrawStatus> {
        match self {
            DrawStatus::Requested => Some(DrawStatus::Approved),
            DrawStatus::Approved => Some(DrawStatus::Funded),
            DrawStatus::Funded => None,
        }
    }
}

impl fmt::Display for DrawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawStatus::Requested => "requested",
            DrawStatus::Approved => "approved",
            DrawStatus::Funded => "funded",
        };
        f.write_str(s)
    }
}

/// A disbursement request against the undrawn commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    pub loan_id: String,
    pub draw_number: u32,
    pub amount: Money,
    pub status: DrawStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funded_on: Option<NaiveDate>,
}

impl Draw {
    /// Requested or approved: reserved against the commitment but not yet funded.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, DrawStatus::Requested | DrawStatus::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Scheduled,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Scheduled => "scheduled",
            PaymentStatus::Paid => "paid",
        })
    }
}

/// A debt-service event generated from one schedule row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub loan_id: String,
    pub payment_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub principal_payment: Money,
    pub interest_payment: Money,
    pub total_payment: Money,
    pub ending_balance: Money,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
}

impl Payment {
    pub(crate) fn from_row(loan_id: &str, row: &ScheduleRow, due_date: Option<NaiveDate>) -> Self {
        Payment {
            loan_id: loan_id.to_string(),
            payment_number: row.month,
            due_date,
            principal_payment: row.principal,
            interest_payment: row.interest,
            total_payment: row.payment,
            ending_balance: row.balance,
            status: PaymentStatus::Scheduled,
            paid_on: None,
        }
    }
}
