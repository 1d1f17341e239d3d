//! AWS Lambda handler for prepayment simulations
//!
//! Accepts a loan and prepayment policy as JSON and returns the rounded
//! simulation report. Invalid input and non-converging loans come back as an
//! `error` body naming the error kind rather than as an invocation failure.

use chrono::{Local, NaiveDate};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use loan_simulator::amortization::formulas;
use loan_simulator::{
    AccelerationSchedule, EngineError, EngineResult, LoanState, LoanTerms, PrepaymentPolicy,
    ScenarioRunner, SimulationConfig, SimulationReport,
};

/// Input for one simulation
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    /// Amount borrowed; derived from the payment when omitted
    #[serde(default)]
    pub principal: Option<f64>,

    /// Monthly interest rate in percent (1.0 = 1% per month)
    pub monthly_rate_pct: f64,

    pub total_periods: i64,

    #[serde(default)]
    pub periods_elapsed: i64,

    /// Payment per period; derived from the terms when omitted
    #[serde(default)]
    pub scheduled_payment: Option<f64>,

    #[serde(default = "default_extra")]
    pub extra_payments_per_period: f64,

    #[serde(default = "default_window")]
    pub acceleration_window_periods: i64,

    #[serde(default)]
    pub acceleration: AccelerationSchedule,

    /// Include the accelerated per-period schedule in the response
    #[serde(default)]
    pub schedule: bool,

    /// Date payoff periods are counted from (default: today)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_extra() -> f64 { 1.0 }
fn default_window() -> i64 { 1 }

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Output from the simulation
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SimulationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub execution_time_ms: u64,
}

impl SimulationRequest {
    fn to_inputs(&self) -> EngineResult<(LoanState, PrepaymentPolicy)> {
        let total_periods = u32::try_from(self.total_periods)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| EngineError::InvalidTerms {
                field: "total_periods",
                reason: format!("must be at least 1, got {}", self.total_periods),
            })?;
        let periods_elapsed = u32::try_from(self.periods_elapsed).map_err(|_| EngineError::InvalidState {
            field: "periods_elapsed",
            reason: format!("must be non-negative, got {}", self.periods_elapsed),
        })?;

        if let Some(payment) = self.scheduled_payment {
            if !payment.is_finite() || payment <= 0.0 {
                return Err(EngineError::InvalidState {
                    field: "scheduled_payment",
                    reason: format!("must be a positive amount, got {}", payment),
                });
            }
        }

        let rate = self.monthly_rate_pct / 100.0;
        let principal = match (self.principal, self.scheduled_payment) {
            (Some(principal), _) => principal,
            (None, Some(payment)) => formulas::annuity_present_value(payment, rate, total_periods),
            (None, None) => {
                return Err(EngineError::InvalidTerms {
                    field: "principal",
                    reason: "required when no scheduled payment is given".to_string(),
                })
            }
        };

        let terms = LoanTerms::new(principal, rate, total_periods)?;
        let state = LoanState::new(terms, periods_elapsed, self.scheduled_payment)?;
        let policy = PrepaymentPolicy::from_raw(self.extra_payments_per_period, self.acceleration_window_periods)?
            .with_schedule(self.acceleration);
        Ok((state, policy))
    }
}

fn simulate(request: &SimulationRequest) -> EngineResult<SimulationReport> {
    let (state, policy) = request.to_inputs()?;
    let runner = ScenarioRunner::with_config(SimulationConfig {
        detailed_output: request.schedule,
        ..Default::default()
    });
    let result = runner.run(&state, &policy)?;
    let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());
    Ok(result.report(as_of))
}

async fn handler(event: LambdaEvent<SimulationRequest>) -> Result<SimulationResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    let response = match simulate(&request) {
        Ok(report) => {
            info!(
                "simulated: saved {:.2} over {} periods",
                report.interest_saved, report.periods_saved
            );
            SimulationResponse {
                report: Some(report),
                error: None,
                execution_time_ms: start.elapsed().as_millis() as u64,
            }
        }
        Err(err) => {
            info!("simulation rejected: {}", err);
            SimulationResponse {
                report: None,
                error: Some(ErrorBody {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                }),
                execution_time_ms: start.elapsed().as_millis() as u64,
            }
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> SimulationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_and_report() {
        let req = request(
            r#"{"principal": 50000, "monthly_rate_pct": 1.0, "total_periods": 48,
                "periods_elapsed": 6, "as_of": "2026-10-19"}"#,
        );
        assert_eq!(req.extra_payments_per_period, 1.0);
        assert_eq!(req.acceleration_window_periods, 1);

        let report = simulate(&req).unwrap();
        assert_eq!(report.scheduled_payment, 1316.69);
        assert_eq!(report.periods_saved, 1);
        assert!(report.interest_saved > 0.0);
        assert_eq!(report.original_payoff_label, "April 2030");
    }

    #[test]
    fn test_principal_from_payment() {
        let req = request(r#"{"monthly_rate_pct": 0.0, "total_periods": 10, "scheduled_payment": 100}"#);
        let (state, _) = req.to_inputs().unwrap();
        assert_eq!(state.terms.principal, 1000.0);
    }

    #[test]
    fn test_error_kinds() {
        let req = request(r#"{"monthly_rate_pct": 1.0, "total_periods": 12}"#);
        assert_eq!(simulate(&req).unwrap_err().kind(), "InvalidTermsError");

        let req = request(
            r#"{"principal": 1000, "monthly_rate_pct": 1.0, "total_periods": 12,
                "acceleration_window_periods": -3}"#,
        );
        assert_eq!(simulate(&req).unwrap_err().kind(), "InvalidPolicyError");

        let req = request(
            r#"{"principal": 100000, "monthly_rate_pct": 5.0, "total_periods": 360,
                "scheduled_payment": 100}"#,
        );
        assert_eq!(simulate(&req).unwrap_err().kind(), "NonConvergenceError");
    }

    #[test]
    fn test_bad_payment_reported_before_principal_derivation() {
        for payment in ["0", "-250"] {
            let req = request(&format!(
                r#"{{"monthly_rate_pct": 1.0, "total_periods": 12, "scheduled_payment": {}}}"#,
                payment
            ));
            match simulate(&req).unwrap_err() {
                EngineError::InvalidState { field, .. } => assert_eq!(field, "scheduled_payment"),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }
}
