//! Loan data structures and loan-book loading

mod data;
pub mod loader;

pub use data::{LoanState, LoanTerms, LoanType};
pub use loader::{load_loans, load_loans_from_reader, LoanRecord, LoanRow};
