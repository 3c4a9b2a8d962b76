use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use super::account::LoanAccount;
use super::records::Draw;
use crate::error::LoanError;
use crate::loan::Loan;
use crate::types::Money;
use crate::LoanResult;

/// Registry of loan accounts that serializes transitions per loan.
///
/// Each account sits behind its own mutex, so concurrent draw operations on
/// one loan run one at a time while different loans proceed in parallel.
#[derive(Debug, Default)]
pub struct LoanBook {
    accounts: RwLock<HashMap<String, Arc<Mutex<LoanAccount>>>>,
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new loan with no draws.
    pub fn open(&self, loan: Loan) -> LoanResult<()> {
        self.insert(LoanAccount::open(loan)?)
    }

    /// Register an account rebuilt from stored records.
    pub fn insert(&self, account: LoanAccount) -> LoanResult<()> {
        account.validate()?;
        let id = account.loan.id.clone();
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| LoanError::LockPoisoned(id.clone()))?;
        if accounts.contains_key(&id) {
            return Err(LoanError::DuplicateLoan(id));
        }
        accounts.insert(id, Arc::new(Mutex::new(account)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn account(&self, loan_id: &str) -> LoanResult<Arc<Mutex<LoanAccount>>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| LoanError::LockPoisoned(loan_id.to_string()))?;
        accounts
            .get(loan_id)
            .cloned()
            .ok_or_else(|| LoanError::UnknownRecord {
                record: "loan".into(),
                id: loan_id.to_string(),
            })
    }

    /// Run `f` while holding the loan's lock.
    pub fn with_account<T>(
        &self,
        loan_id: &str,
        f: impl FnOnce(&mut LoanAccount) -> LoanResult<T>,
    ) -> LoanResult<T> {
        let account = self.account(loan_id)?;
        let mut guard = account
            .lock()
            .map_err(|_| LoanError::LockPoisoned(loan_id.to_string()))?;
        f(&mut *guard)
    }

    pub fn request_draw(
        &self,
        loan_id: &str,
        amount: Money,
        requested_on: Option<NaiveDate>,
    ) -> LoanResult<Draw> {
        self.with_account(loan_id, |a| a.request_draw(amount, requested_on).cloned())
    }

    pub fn approve_draw(
        &self,
        loan_id: &str,
        draw_number: u32,
        approved_on: Option<NaiveDate>,
    ) -> LoanResult<Draw> {
        self.with_account(loan_id, |a| a.approve_draw(draw_number, approved_on).cloned())
    }

    pub fn fund_draw(
        &self,
        loan_id: &str,
        draw_number: u32,
        funded_on: Option<NaiveDate>,
    ) -> LoanResult<Draw> {
        self.with_account(loan_id, |a| a.fund_draw(draw_number, funded_on).cloned())
    }

    /// Copy of the account as it stands now.
    pub fn snapshot(&self, loan_id: &str) -> LoanResult<LoanAccount> {
        self.with_account(loan_id, |a| Ok(a.clone()))
    }

    /// Current terms and funding of every loan, ordered by id.
    pub fn loans(&self) -> LoanResult<Vec<Loan>> {
        let handles: Vec<(String, Arc<Mutex<LoanAccount>>)> = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| LoanError::LockPoisoned("*".into()))?;
            accounts
                .iter()
                .map(|(id, a)| (id.clone(), Arc::clone(a)))
                .collect()
        };

        let mut loans = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let guard = handle.lock().map_err(|_| LoanError::LockPoisoned(id))?;
            loans.push(guard.loan.clone());
        }
        loans.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(loans)
    }
}
