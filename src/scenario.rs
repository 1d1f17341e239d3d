//! Scenario runner for batch simulations
//!
//! Simulations are independent pure computations, so batches fan out across
//! the rayon pool. Results always come back in input order.

use rayon::prelude::*;

use crate::amortization::{AmortizationEngine, SimulationConfig, SimulationResult};
use crate::error::EngineResult;
use crate::loan::{LoanRecord, LoanState, LoanType};
use crate::prepayment::PrepaymentPolicy;

/// Upper end of the extra-payments range offered by the simulator
pub const MAX_EXTRA_PAYMENTS: u32 = 5;

/// Outcome of simulating one loan from a book
#[derive(Debug, Clone)]
pub struct BookOutcome {
    pub id: String,
    pub loan_type: LoanType,
    pub result: EngineResult<SimulationResult>,
}

/// Runs many simulations against one shared engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let state = LoanType::Vehicle.default_state();
/// for (extra, result) in runner.sweep_extra(&state, 12, MAX_EXTRA_PAYMENTS) {
///     println!("{} extra: {:?}", extra, result.map(|r| r.interest_saved));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: AmortizationEngine,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            engine: AmortizationEngine::new(config),
        }
    }

    /// Run a single simulation
    pub fn run(&self, state: &LoanState, policy: &PrepaymentPolicy) -> EngineResult<SimulationResult> {
        self.engine.simulate(state, policy)
    }

    /// Run several policies against the same loan
    pub fn run_policies(
        &self,
        state: &LoanState,
        policies: &[PrepaymentPolicy],
    ) -> Vec<EngineResult<SimulationResult>> {
        policies
            .par_iter()
            .map(|policy| self.engine.simulate(state, policy))
            .collect()
    }

    /// Front-loaded policies with 0..=max_extra extra payments over `window`
    /// periods, paired with the extra count
    pub fn sweep_extra(
        &self,
        state: &LoanState,
        window: u32,
        max_extra: u32,
    ) -> Vec<(u32, EngineResult<SimulationResult>)> {
        let policies: Vec<PrepaymentPolicy> = (0..=max_extra)
            .map(|extra| PrepaymentPolicy {
                extra_payments_per_period: extra as f64,
                acceleration_window_periods: window,
                ..PrepaymentPolicy::none()
            })
            .collect();

        (0..=max_extra).zip(self.run_policies(state, &policies)).collect()
    }

    /// Simulate every loan in a book with its own policy
    pub fn run_book(&self, loans: &[LoanRecord]) -> Vec<BookOutcome> {
        loans
            .par_iter()
            .map(|loan| BookOutcome {
                id: loan.id.clone(),
                loan_type: loan.loan_type,
                result: self.engine.simulate(&loan.state, &loan.policy),
            })
            .collect()
    }
}
