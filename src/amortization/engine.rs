//! Amortization engine: scheduled payment, balances, and prepayment simulation

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::formulas;
use super::result::SimulationResult;
use super::schedule::{Schedule, ScheduleRow};
use super::state::ScheduleState;
use crate::error::{EngineError, EngineResult};
use crate::loan::{LoanState, LoanTerms};
use crate::prepayment::PrepaymentPolicy;

/// Tolerance for comparing the closed-form baseline total against the loop
const CLOSED_FORM_TOLERANCE: f64 = 0.01;

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Each schedule may run at most `safety_factor * total_periods` periods
    pub safety_factor: u32,

    /// Balance at or below which the loan counts as paid off
    pub balance_epsilon: f64,

    /// Whether to record per-period schedule rows
    pub detailed_output: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            safety_factor: 2,
            balance_epsilon: 1e-6,
            detailed_output: false,
        }
    }
}

/// Stateless amortization engine. Every operation is a pure function of its
/// inputs, so one engine can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: SimulationConfig,
}

impl AmortizationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Level payment that fully amortizes the terms
    pub fn compute_scheduled_payment(&self, terms: &LoanTerms) -> EngineResult<f64> {
        terms.validate()?;
        Ok(formulas::annuity_payment(
            terms.principal,
            terms.periodic_rate,
            terms.total_periods,
        ))
    }

    /// Outstanding balance as the present value of the remaining scheduled
    /// payments. Always recomputed from `periods_elapsed`.
    pub fn remaining_balance(&self, state: &LoanState) -> EngineResult<f64> {
        state.validate()?;
        let remaining = state.remaining_periods();
        if remaining == 0 {
            return Ok(0.0);
        }
        let rate = state.terms.periodic_rate;
        let balance = formulas::annuity_present_value(state.scheduled_payment, rate, remaining);
        if rate == 0.0 {
            // An oversized payment cannot make more owed than was borrowed
            return Ok(balance.min(state.terms.principal));
        }
        Ok(balance.max(0.0))
    }

    /// Balance actually owed: the principal rolled forward with the payments
    /// made so far. Equals [`remaining_balance`](Self::remaining_balance) when
    /// the scheduled payment exactly amortizes the terms.
    pub fn outstanding_balance(&self, state: &LoanState) -> EngineResult<f64> {
        state.validate()?;
        if state.remaining_periods() == 0 {
            return Ok(0.0);
        }
        let balance = formulas::rolled_forward_balance(
            state.terms.principal,
            state.scheduled_payment,
            state.terms.periodic_rate,
            state.periods_elapsed,
        );
        Ok(balance.max(0.0))
    }

    /// Compare paying as scheduled against paying with the prepayment policy.
    pub fn simulate(&self, state: &LoanState, policy: &PrepaymentPolicy) -> EngineResult<SimulationResult> {
        policy.validate()?;
        state.validate()?;

        let starting_balance = self.outstanding_balance(state)?;
        let rate = state.terms.periodic_rate;
        let payment = state.scheduled_payment;
        let remaining = state.remaining_periods();

        let first_interest = starting_balance * rate;
        if starting_balance > self.config.balance_epsilon && rate > 0.0 && payment <= first_interest {
            warn!(
                "payment {:.2} does not cover first-period interest {:.2}; loan never amortizes",
                payment, first_interest
            );
            return Err(EngineError::NonConvergence {
                iterations: 0,
                payment,
                interest: first_interest,
            });
        }

        debug!(
            "simulating from balance {:.6} over {} remaining periods at rate {}",
            starting_balance, remaining, rate
        );

        let baseline = self.run_schedule(state, starting_balance, &PrepaymentPolicy::none())?;
        self.check_closed_form(state, starting_balance, &baseline);

        let accelerated = if policy.is_none() {
            baseline.clone()
        } else {
            self.run_schedule(state, starting_balance, policy)?
        };

        debug!(
            "baseline pays off in {} periods, accelerated in {}",
            baseline.payoff_period, accelerated.payoff_period
        );

        Ok(SimulationResult {
            starting_balance,
            scheduled_payment: payment,
            original_total_paid: baseline.total_paid,
            new_total_paid: accelerated.total_paid,
            original_total_interest: baseline.total_interest,
            new_total_interest: accelerated.total_interest,
            // Clamp float noise: paying no less each period never costs more
            interest_saved: (baseline.total_paid - accelerated.total_paid).max(0.0),
            original_payoff_period: baseline.payoff_period,
            new_payoff_period: accelerated.payoff_period,
            periods_saved: baseline.payoff_period.saturating_sub(accelerated.payoff_period),
            baseline_schedule: baseline.rows,
            accelerated_schedule: accelerated.rows,
        })
    }

    /// Run a single payoff schedule from the loan's outstanding balance
    pub fn project_schedule(&self, state: &LoanState, policy: &PrepaymentPolicy) -> EngineResult<Schedule> {
        policy.validate()?;
        let starting_balance = self.outstanding_balance(state)?;
        self.run_schedule(state, starting_balance, policy)
    }

    fn max_iterations(&self, state: &LoanState) -> u32 {
        self.config
            .safety_factor
            .max(1)
            .saturating_mul(state.terms.total_periods)
    }

    /// Advance a schedule period by period until the balance is paid off:
    /// interest accrues first, then the (possibly boosted) payment is applied,
    /// capped at the balance.
    fn run_schedule(
        &self,
        state: &LoanState,
        starting_balance: f64,
        policy: &PrepaymentPolicy,
    ) -> EngineResult<Schedule> {
        let rate = state.terms.periodic_rate;
        let payment = state.scheduled_payment;
        let remaining = state.remaining_periods();
        let max_iterations = self.max_iterations(state);

        let mut schedule = Schedule::new();
        let mut running = ScheduleState::opening(starting_balance);

        while !running.is_paid_off(self.config.balance_epsilon) {
            if running.period >= max_iterations {
                warn!(
                    "balance {:.2} still outstanding after {} periods",
                    running.balance, running.period
                );
                return Err(EngineError::NonConvergence {
                    iterations: running.period,
                    payment,
                    interest: starting_balance * rate,
                });
            }

            let period_index = running.period;
            let opening_balance = running.balance;
            let interest = running.accrue_interest(rate);
            let due = payment * policy.payment_multiplier(period_index, remaining);
            let applied = running.apply_payment(due);

            if self.config.detailed_output {
                schedule.add_row(ScheduleRow {
                    period: running.period,
                    opening_balance,
                    interest,
                    scheduled_payment: payment,
                    extra_payment: due - payment,
                    payment: applied,
                    principal_paid: applied - interest,
                    closing_balance: running.balance,
                });
            }
        }

        // Everything owed was repaid, so the total is exact whatever order
        // the payments were summed in
        schedule.total_paid = starting_balance + running.total_interest;
        schedule.total_interest = running.total_interest;
        schedule.payoff_period = running.period;
        Ok(schedule)
    }

    /// For a payment that exactly amortizes the outstanding balance, the loop
    /// baseline must agree with `payment * remaining_periods`.
    fn check_closed_form(&self, state: &LoanState, starting_balance: f64, baseline: &Schedule) {
        let remaining = state.remaining_periods();
        if remaining == 0 {
            return;
        }
        let required = formulas::annuity_payment(starting_balance, state.terms.periodic_rate, remaining);
        let payment = state.scheduled_payment;
        if (required - payment).abs() > 1e-9 * payment.max(1.0) {
            debug!(
                "payment {:.6} differs from exact amortizing payment {:.6}; baseline runs {} periods",
                payment, required, baseline.payoff_period
            );
            return;
        }
        let closed_form = payment * remaining as f64;
        if (closed_form - baseline.total_paid).abs() > CLOSED_FORM_TOLERANCE
            || baseline.payoff_period != remaining
        {
            warn!(
                "closed-form baseline {:.2} over {} periods disagrees with loop {:.2} over {} periods",
                closed_form, remaining, baseline.total_paid, baseline.payoff_period
            );
        }
    }
}
