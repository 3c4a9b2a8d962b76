use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::account::LoanAccount;
use crate::types::*;
use crate::LoanResult;

/// One lifecycle step, as submitted by a caller holding a stored account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoanAction {
    RequestDraw {
        amount: Money,
        #[serde(default)]
        on: Option<NaiveDate>,
    },
    ApproveDraw {
        draw_number: u32,
        #[serde(default)]
        on: Option<NaiveDate>,
    },
    FundDraw {
        draw_number: u32,
        #[serde(default)]
        on: Option<NaiveDate>,
    },
    SchedulePayments,
    MarkPaid {
        payment_number: u32,
        #[serde(default)]
        on: Option<NaiveDate>,
    },
}

/// An account plus the actions to replay against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionBatch {
    pub account: LoanAccount,
    #[serde(default)]
    pub actions: Vec<LoanAction>,
}

/// Apply `action` to `account`.
pub fn apply_action(account: &mut LoanAccount, action: &LoanAction) -> LoanResult<()> {
    match action {
        LoanAction::RequestDraw { amount, on } => {
            account.request_draw(*amount, *on)?;
        }
        LoanAction::ApproveDraw { draw_number, on } => {
            account.approve_draw(*draw_number, *on)?;
        }
        LoanAction::FundDraw { draw_number, on } => {
            account.fund_draw(*draw_number, *on)?;
        }
        LoanAction::SchedulePayments => {
            account.schedule_payments()?;
        }
        LoanAction::MarkPaid { payment_number, on } => {
            account.mark_payment_paid(*payment_number, *on)?;
        }
    }
    Ok(())
}

/// Replay a batch in order. The first failing action aborts the batch and
/// its error is returned; the caller's stored account is untouched.
pub fn apply_actions(batch: &ActionBatch) -> LoanResult<ComputationOutput<LoanAccount>> {
    let start = Instant::now();
    batch.account.validate()?;

    let mut account = batch.account.clone();
    for action in &batch.actions {
        apply_action(&mut account, action)?;
    }

    let mut warnings = Vec::new();
    let funded_principal: Money = account
        .payments
        .iter()
        .map(|p| p.principal_payment)
        .sum();
    if !account.payments.is_empty()
        && account.payments.last().is_some_and(|p| p.ending_balance.is_zero())
        && funded_principal != account.loan.funded_amount
    {
        warnings.push(format!(
            "Payment schedule covers {funded_principal} but {} is funded; regenerate payments",
            account.loan.funded_amount
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan draw and payment lifecycle replay",
        &serde_json::json!({
            "loan_id": batch.account.loan.id,
            "actions": batch.actions.len(),
        }),
        warnings,
        elapsed,
        account,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Loan, LoanStatus};
    use crate::LoanError;
    use rust_decimal_macros::dec;

    fn batch(actions: Vec<LoanAction>) -> ActionBatch {
        let loan = Loan::new("L-1", "P-1", dec!(900), dec!(0.12), 3, 0).unwrap();
        ActionBatch {
            account: LoanAccount::open(loan).unwrap(),
            actions,
        }
    }

    #[test]
    fn test_replay_full_lifecycle() {
        let b = batch(vec![
            LoanAction::RequestDraw { amount: dec!(900), on: None },
            LoanAction::ApproveDraw { draw_number: 1, on: None },
            LoanAction::FundDraw { draw_number: 1, on: None },
            LoanAction::SchedulePayments,
            LoanAction::MarkPaid { payment_number: 1, on: None },
        ]);
        let out = apply_actions(&b).unwrap();
        assert_eq!(out.result.loan.status, LoanStatus::FullyDrawn);
        assert_eq!(out.result.payments.len(), 3);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_replay_stops_on_error() {
        let b = batch(vec![
            LoanAction::RequestDraw { amount: dec!(500), on: None },
            LoanAction::FundDraw { draw_number: 1, on: None },
        ]);
        assert!(matches!(
            apply_actions(&b),
            Err(LoanError::InvalidTransition { .. })
        ));
        assert!(b.account.draws.is_empty());
    }

    #[test]
    fn test_stale_schedule_warns() {
        let b = batch(vec![
            LoanAction::RequestDraw { amount: dec!(300), on: None },
            LoanAction::ApproveDraw { draw_number: 1, on: None },
            LoanAction::FundDraw { draw_number: 1, on: None },
            LoanAction::SchedulePayments,
            LoanAction::RequestDraw { amount: dec!(300), on: None },
            LoanAction::ApproveDraw { draw_number: 2, on: None },
            LoanAction::FundDraw { draw_number: 2, on: None },
        ]);
        let out = apply_actions(&b).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_actions_deserialize() {
        let json = r#"[
            {"action": "request_draw", "amount": "250000", "on": "2025-03-01"},
            {"action": "approve_draw", "draw_number": 1},
            {"action": "schedule_payments"}
        ]"#;
        let actions: Vec<LoanAction> = serde_json::from_str(json).unwrap();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[2], LoanAction::SchedulePayments));
    }
}
