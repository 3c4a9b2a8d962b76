//! Loan terms and status shared by the amortization engine and the
//! draw lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LoanError;
use crate::types::{Money, Rate};
use crate::LoanResult;

/// Informational loan classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Construction,
    Bridge,
    Mezzanine,
    Permanent,
    Other,
}

/// Reference rate a floating loan is priced over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexRate {
    Sofr,
    Prime,
    Treasury,
    Libor,
}

/// How the loan's interest rate is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rate_type", rename_all = "snake_case")]
pub enum RateTerms {
    #[default]
    Fixed,
    Floating {
        index_rate: IndexRate,
        spread: Rate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        floor_rate: Option<Rate>,
        /// Current fixing of the index, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index_value: Option<Rate>,
    },
}

/// Funding status of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Committed,
    PartiallyDrawn,
    FullyDrawn,
    PaidOff,
}

impl LoanStatus {
    /// Draw status implied by the funded and committed amounts.
    pub fn from_funding(funded: Money, commitment: Money) -> Self {
        if funded <= Decimal::ZERO {
            LoanStatus::Committed
        } else if funded >= commitment {
            LoanStatus::FullyDrawn
        } else {
            LoanStatus::PartiallyDrawn
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoanStatus::Committed => "committed",
            LoanStatus::PartiallyDrawn => "partially_drawn",
            LoanStatus::FullyDrawn => "fully_drawn",
            LoanStatus::PaidOff => "paid_off",
        };
        f.write_str(s)
    }
}

/// A financing commitment owned by a single project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    #[serde(default)]
    pub loan_type: LoanType,
    pub commitment_amount: Money,
    #[serde(default)]
    pub funded_amount: Money,
    pub interest_rate: Rate,
    #[serde(default)]
    pub rate_terms: RateTerms,
    pub term_months: u32,
    #[serde(default)]
    pub io_period_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortization_months: Option<u32>,
    #[serde(default)]
    pub origination_fee_percent: Rate,
    #[serde(default)]
    pub exit_fee_percent: Rate,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

impl Loan {
    /// A fixed-rate loan in `committed` status with nothing funded.
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        commitment_amount: Money,
        interest_rate: Rate,
        term_months: u32,
        io_period_months: u32,
    ) -> LoanResult<Self> {
        let loan = Loan {
            id: id.into(),
            project_id: project_id.into(),
            name: String::new(),
            lender: None,
            loan_type: LoanType::default(),
            commitment_amount,
            funded_amount: Decimal::ZERO,
            interest_rate,
            rate_terms: RateTerms::Fixed,
            term_months,
            io_period_months,
            amortization_months: None,
            origination_fee_percent: Decimal::ZERO,
            exit_fee_percent: Decimal::ZERO,
            status: LoanStatus::Committed,
            first_payment_date: None,
        };
        loan.validate()?;
        Ok(loan)
    }

    /// Check every field invariant. Nothing is clamped.
    pub fn validate(&self) -> LoanResult<()> {
        if self.commitment_amount < Decimal::ZERO {
            return Err(LoanError::terms(
                "commitment_amount",
                "Commitment cannot be negative",
            ));
        }
        if self.funded_amount < Decimal::ZERO {
            return Err(LoanError::terms(
                "funded_amount",
                "Funded amount cannot be negative",
            ));
        }
        if self.funded_amount > self.commitment_amount {
            return Err(LoanError::terms(
                "funded_amount",
                format!(
                    "Funded amount {} exceeds commitment {}",
                    self.funded_amount, self.commitment_amount
                ),
            ));
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(LoanError::terms(
                "interest_rate",
                "Interest rate cannot be negative",
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
            if amort < self.term_months - self.io_period_months {
                return Err(LoanError::terms(
                    "amortization_months",
                    "Amortization cannot be shorter than the post interest-only term",
                ));
            }
        }
        for (field, fee) in [
            ("origination_fee_percent", self.origination_fee_percent),
            ("exit_fee_percent", self.exit_fee_percent),
        ] {
            if fee < Decimal::ZERO {
                return Err(LoanError::terms(field, "Fee cannot be negative"));
            }
        }
        if let RateTerms::Floating {
            spread, floor_rate, ..
        } = &self.rate_terms
        {
            if *spread < Decimal::ZERO {
                return Err(LoanError::terms("spread", "Spread cannot be negative"));
            }
            if floor_rate.is_some_and(|f| f < Decimal::ZERO) {
                return Err(LoanError::terms("floor_rate", "Floor cannot be negative"));
            }
        }
        Ok(())
    }

    /// Rate used for schedule math, plus a warning when a floating loan has no
    /// index fixing and the stored rate is used instead.
    pub fn effective_rate(&self) -> (Rate, Option<String>) {
        match &self.rate_terms {
            RateTerms::Fixed => (self.interest_rate, None),
            RateTerms::Floating {
                index_rate,
                spread,
                floor_rate,
                index_value,
            } => match index_value {
                Some(index) => {
                    let all_in = *index + *spread;
                    let rate = floor_rate.map_or(all_in, |floor| all_in.max(floor));
                    (rate, None)
                }
                None => (
                    self.interest_rate,
                    Some(format!(
                        "Floating loan {} has no {:?} fixing; using stored interest_rate",
                        self.id, index_rate
                    )),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Loan {
        Loan::new("L-1", "P-1", dec!(1_000_000), dec!(0.08), 24, 6).unwrap()
    }

    #[test]
    fn test_new_loan_is_committed() {
        let loan = sample();
        assert_eq!(loan.status, LoanStatus::Committed);
        assert_eq!(loan.funded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_io_longer_than_term_rejected() {
        let err = Loan::new("L-1", "P-1", dec!(100), dec!(0.05), 12, 13).unwrap_err();
        assert!(matches!(err, LoanError::InvalidLoanTerms { ref field, .. } if field == "io_period_months"));
    }

    #[test]
    fn test_overfunded_rejected() {
        let mut loan = sample();
        loan.funded_amount = dec!(1_000_001);
        assert!(loan.validate().is_err());
    }

    #[test]
    fn test_short_amortization_rejected() {
        let mut loan = sample();
        loan.amortization_months = Some(12);
        assert!(loan.validate().is_err());
        loan.amortization_months = Some(360);
        assert!(loan.validate().is_ok());
    }

    #[test]
    fn test_floating_rate_floor_binds() {
        let mut loan = sample();
        loan.rate_terms = RateTerms::Floating {
            index_rate: IndexRate::Sofr,
            spread: dec!(0.03),
            floor_rate: Some(dec!(0.065)),
            index_value: Some(dec!(0.02)),
        };
        let (rate, warning) = loan.effective_rate();
        assert_eq!(rate, dec!(0.065));
        assert!(warning.is_none());
    }

    #[test]
    fn test_floating_rate_above_floor() {
        let mut loan = sample();
        loan.rate_terms = RateTerms::Floating {
            index_rate: IndexRate::Prime,
            spread: dec!(0.02),
            floor_rate: Some(dec!(0.05)),
            index_value: Some(dec!(0.0425)),
        };
        assert_eq!(loan.effective_rate().0, dec!(0.0625));
    }

    #[test]
    fn test_floating_without_fixing_warns() {
        let mut loan = sample();
        loan.rate_terms = RateTerms::Floating {
            index_rate: IndexRate::Sofr,
            spread: dec!(0.03),
            floor_rate: None,
            index_value: None,
        };
        let (rate, warning) = loan.effective_rate();
        assert_eq!(rate, dec!(0.08));
        assert!(warning.is_some());
    }

    #[test]
    fn test_status_from_funding() {
        assert_eq!(
            LoanStatus::from_funding(Decimal::ZERO, dec!(10)),
            LoanStatus::Committed
        );
        assert_eq!(
            LoanStatus::from_funding(dec!(4), dec!(10)),
            LoanStatus::PartiallyDrawn
        );
        assert_eq!(
            LoanStatus::from_funding(dec!(10), dec!(10)),
            LoanStatus::FullyDrawn
        );
    }

    #[test]
    fn test_deserialize_floating_loan() {
        let json = r#"{
            "id": "L-9",
            "project_id": "P-2",
            "commitment_amount": "2500000",
            "interest_rate": "0.09",
            "rate_terms": {"rate_type": "floating", "index_rate": "sofr", "spread": "0.035"},
            "term_months": 36
        }"#;
        let loan: Loan = serde_json::from_str(json).unwrap();
        assert_eq!(loan.io_period_months, 0);
        assert_eq!(loan.status, LoanStatus::Committed);
        assert!(matches!(loan.rate_terms, RateTerms::Floating { index_rate: IndexRate::Sofr, .. }));
    }
}
