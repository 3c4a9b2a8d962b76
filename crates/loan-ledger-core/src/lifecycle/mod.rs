pub mod account;
pub mod actions;
pub mod ledger;
pub mod metrics;
pub mod records;

pub use account::LoanAccount;
pub use actions::{apply_action, apply_actions, ActionBatch, LoanAction};
pub use ledger::LoanBook;
pub use metrics::{
    available_to_fund, loan_summary, summarize_portfolio, utilization, weighted_average_rate,
    LoanSummary, PortfolioSummary,
};
pub use records::{Draw, DrawStatus, Payment, PaymentStatus};
