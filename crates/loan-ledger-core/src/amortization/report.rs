use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{generate_schedule, AmortizationInput, ScheduleRow};
use crate::types::*;
use crate::LoanResult;

/// Derived scalars shown alongside a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_payments: Money,
    /// Total interest spread evenly across the term's months
    pub monthly_average: Money,
    /// Total interest per year of term
    pub annual_average: Money,
}

/// Output of the amortization builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub schedule: Vec<ScheduleRow>,
    /// Level payment over the amortizing period; zero for interest-only loans
    pub level_payment: Money,
    /// Principal retired in the final month above the level amount
    pub balloon_payment: Money,
    /// Balance left at maturity (non-zero only for full-term interest-only)
    pub ending_balance: Money,
    #[serde(flatten)]
    pub summary: ScheduleSummary,
}

/// Totals and averages for any schedule.
pub fn summarize_schedule(rows: &[ScheduleRow], term_months: u32) -> ScheduleSummary {
    let total_interest: Money = rows.iter().map(|r| r.interest).sum();
    let total_principal: Money = rows.iter().map(|r| r.principal).sum();
    let total_payments: Money = rows.iter().map(|r| r.payment).sum();

    let term = Decimal::from(term_months);
    let monthly_average = ratio_or_zero(total_interest, term);
    let annual_average = ratio_or_zero(total_interest * dec!(12), term);

    ScheduleSummary {
        total_interest,
        total_principal,
        total_payments,
        monthly_average,
        annual_average,
    }
}

/// Build a schedule and its summary inside the standard output envelope.
pub fn build_amortization(
    input: &AmortizationInput,
) -> LoanResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = generate_schedule(input)?;

    let amortizing = input.amortizing_months();
    if amortizing == 0 && input.principal > Decimal::ZERO {
        warnings.push(format!(
            "Loan is interest-only for all {} months; {} remains due at maturity",
            input.term_months, input.principal
        ));
    }
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate; principal repaid straight-line".into());
    }

    let level_payment = if amortizing == 0 {
        Decimal::ZERO
    } else {
        schedule
            .get(input.io_period_months as usize)
            .map_or(Decimal::ZERO, |row| row.payment)
    };

    let balloon_payment = match (input.amortization_months, schedule.last()) {
        (Some(amort), Some(last)) if amort > amortizing => {
            let level_principal = (level_payment - last.interest).max(Decimal::ZERO);
            (last.principal - level_principal).max(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    };
    if balloon_payment > Decimal::ZERO {
        warnings.push(format!(
            "Amortization of {} months exceeds the {amortizing} month amortizing period; balloon of {balloon_payment} at maturity",
            input.amortization_months.unwrap_or_default()
        ));
    }

    let ending_balance = schedule.last().map_or(Decimal::ZERO, |r| r.balance);
    let summary = summarize_schedule(&schedule, input.term_months);

    let output = AmortizationOutput {
        schedule,
        level_payment,
        balloon_payment,
        ending_balance,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with interest-only period",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "term_months": input.term_months,
            "io_period_months": input.io_period_months,
            "amortization_months": input.amortization_months,
            "round_to_cents": input.round_to_cents,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_averages() {
        let rows = vec![
            ScheduleRow {
                month: 1,
                payment: dec!(110),
                principal: dec!(100),
                interest: dec!(10),
                balance: dec!(100),
            },
            ScheduleRow {
                month: 2,
                payment: dec!(105),
                principal: dec!(100),
                interest: dec!(5),
                balance: Decimal::ZERO,
            },
        ];
        let s = summarize_schedule(&rows, 2);
        assert_eq!(s.total_interest, dec!(15));
        assert_eq!(s.total_principal, dec!(200));
        assert_eq!(s.total_payments, dec!(215));
        assert_eq!(s.monthly_average, dec!(7.5));
        // 15 over a 2/12-year term = 90 per year
        assert_eq!(s.annual_average, dec!(90));
    }

    #[test]
    fn test_build_amortization_envelope() {
        let input = AmortizationInput::new(dec!(1_000_000), dec!(0.08), 24, 6);
        let out = build_amortization(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.schedule.len(), 24);
        assert_eq!(r.level_payment, r.schedule[6].payment);
        assert_eq!(r.balloon_payment, Decimal::ZERO);
        assert_eq!(r.ending_balance, Decimal::ZERO);
        assert!(out.warnings.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_full_term_io_warns() {
        let input = AmortizationInput::new(dec!(300_000), dec!(0.1), 12, 12);
        let out = build_amortization(&input).unwrap();
        assert_eq!(out.result.level_payment, Decimal::ZERO);
        assert_eq!(out.result.ending_balance, dec!(300_000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_balloon_reported() {
        let mut input = AmortizationInput::new(dec!(1_000_000), dec!(0.06), 120, 0);
        input.amortization_months = Some(300);
        let out = build_amortization(&input).unwrap();
        assert!(out.result.balloon_payment > dec!(500_000));
        assert!((out.result.summary.total_principal - dec!(1_000_000)).abs() < dec!(0.01));
    }
}
