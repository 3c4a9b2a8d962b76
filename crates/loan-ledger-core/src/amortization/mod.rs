pub mod report;
pub mod schedule;

pub use report::{build_amortization, summarize_schedule, AmortizationOutput, ScheduleSummary};
pub use schedule::{compute_schedule, generate_schedule, AmortizationInput, ScheduleRow};
