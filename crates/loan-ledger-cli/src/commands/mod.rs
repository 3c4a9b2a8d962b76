pub mod amortize;
pub mod loans;
