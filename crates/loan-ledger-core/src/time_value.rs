use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanError;
use crate::types::{Money, Rate};
use crate::LoanResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Periodic rate for monthly compounding of a nominal annual rate.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Level payment that retires `balance` over `periods` at `periodic_rate`.
///
/// Standard annuity formula `b·r / (1 − (1+r)^−n)`. A zero rate falls back to
/// straight-line `b / n`. When `(1+r)^n` exceeds the Decimal range the discount
/// term is negligible and the payment collapses to interest only, `b·r`.
/// The annuity ratio is formed before scaling by the balance, so a large
/// balance never multiplies the raw growth factor.
pub fn level_payment(balance: Money, periodic_rate: Rate, periods: u32) -> LoanResult<Money> {
    if periods == 0 {
        return Err(LoanError::terms("periods", "Number of periods must be > 0"));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(LoanError::terms("periodic_rate", "Rate cannot be negative"));
    }

    let n = Decimal::from(periods);
    if periodic_rate.is_zero() {
        return Ok(balance / n);
    }

    let factor = match (Decimal::ONE + periodic_rate).checked_powu(u64::from(periods)) {
        Some(f) => f,
        None => return Ok(balance * periodic_rate),
    };

    // Rates below Decimal resolution round the factor back to one.
    if factor <= Decimal::ONE {
        return Ok(balance / n);
    }

    let ratio = periodic_rate * factor / (factor - Decimal::ONE);
    Ok(balance * ratio)
}
