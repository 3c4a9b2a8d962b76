pub mod error;
pub mod loan;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "lifecycle")]
pub mod lifecycle;

pub use error::LoanError;
pub use loan::{IndexRate, Loan, LoanStatus, LoanType, RateTerms};
pub use types::*;

/// Standard result type for all loan-ledger operations
pub type LoanResult<T> = Result<T, LoanError>;
