use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LoanError {
    #[error("Invalid loan terms: {field} — {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Draw of {requested} exceeds remaining commitment of {available}")]
    ExceedsCommitment {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Invalid transition: {record} cannot move from {from} to {to}")]
    InvalidTransition {
        record: String,
        from: String,
        to: String,
    },

    #[error("Unknown {record}: {id}")]
    UnknownRecord { record: String, id: String },

    #[error("Loan already registered: {0}")]
    DuplicateLoan(String),

    #[error("Lock poisoned for loan {0}")]
    LockPoisoned(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanError {
    pub(crate) fn terms(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidLoanTerms {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transition(
        record: impl Into<String>,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        LoanError::InvalidTransition {
            record: record.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization(e.to_string())
    }
}
