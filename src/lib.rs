//! Loan Simulator - amortization and prepayment simulation engine
//!
//! This library provides:
//! - Scheduled payment for fully amortizing loans (annuity formula)
//! - Outstanding balance at any point of the loan's life
//! - Side-by-side simulation of the scheduled payoff against recurring extra
//!   principal, with interest saved, periods saved and payoff dates
//! - Batch simulation of policy sweeps and loan books

pub mod error;
pub mod loan;
pub mod prepayment;
pub mod amortization;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use loan::{LoanState, LoanTerms, LoanType};
pub use prepayment::{AccelerationSchedule, PrepaymentPolicy};
pub use amortization::{AmortizationEngine, SimulationConfig, SimulationReport, SimulationResult};
pub use scenario::ScenarioRunner;
