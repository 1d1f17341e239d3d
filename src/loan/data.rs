//! Loan value types and loan-type presets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amortization::formulas;
use crate::error::{EngineError, EngineResult};

/// Contractual terms of a fully amortizing loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Interest rate per payment period as a fraction (0.01 = 1% per month)
    pub periodic_rate: f64,

    /// Number of payments over the full life of the loan
    pub total_periods: u32,
}

impl LoanTerms {
    /// Build validated terms
    pub fn new(principal: f64, periodic_rate: f64, total_periods: u32) -> EngineResult<Self> {
        let terms = Self { principal, periodic_rate, total_periods };
        terms.validate()?;
        Ok(terms)
    }

    /// Build terms from a monthly rate quoted in percent (1.0 = 1% per month)
    pub fn from_percent(principal: f64, rate_pct: f64, total_periods: u32) -> EngineResult<Self> {
        Self::new(principal, rate_pct / 100.0, total_periods)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(EngineError::terms(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if !self.periodic_rate.is_finite() || self.periodic_rate < 0.0 {
            return Err(EngineError::terms(
                "periodic_rate",
                format!("must be a non-negative fraction, got {}", self.periodic_rate),
            ));
        }
        if self.total_periods == 0 {
            return Err(EngineError::terms("total_periods", "must be at least 1"));
        }
        Ok(())
    }
}

/// A loan part-way through its life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub terms: LoanTerms,

    /// Payments already made (0..=total_periods)
    pub periods_elapsed: u32,

    /// Payment per period
    pub scheduled_payment: f64,
}

impl LoanState {
    /// Build a validated state. When `scheduled_payment` is `None` it is
    /// derived from the terms with the annuity formula.
    pub fn new(
        terms: LoanTerms,
        periods_elapsed: u32,
        scheduled_payment: Option<f64>,
    ) -> EngineResult<Self> {
        terms.validate()?;
        let scheduled_payment = match scheduled_payment {
            Some(payment) => payment,
            None => formulas::annuity_payment(
                terms.principal,
                terms.periodic_rate,
                terms.total_periods,
            ),
        };
        let state = Self { terms, periods_elapsed, scheduled_payment };
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.terms.validate()?;
        if self.periods_elapsed > self.terms.total_periods {
            return Err(EngineError::state(
                "periods_elapsed",
                format!(
                    "{} exceeds total periods {}",
                    self.periods_elapsed, self.terms.total_periods
                ),
            ));
        }
        if !self.scheduled_payment.is_finite() || self.scheduled_payment <= 0.0 {
            return Err(EngineError::state(
                "scheduled_payment",
                format!("must be a positive amount, got {}", self.scheduled_payment),
            ));
        }
        Ok(())
    }

    /// Payments still due under the original schedule
    pub fn remaining_periods(&self) -> u32 {
        self.terms.total_periods.saturating_sub(self.periods_elapsed)
    }
}

/// Loan categories offered by the simulator, each with default inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Vehicle,
    Property,
    Other,
}

impl LoanType {
    pub const ALL: [LoanType; 3] = [LoanType::Vehicle, LoanType::Property, LoanType::Other];

    /// Default loan record for this category.
    ///
    /// The preset payments are the quoted installment values, which do not
    /// always match the annuity payment for the preset terms exactly.
    pub fn default_state(&self) -> LoanState {
        let (principal, rate_pct, total_periods, periods_elapsed, scheduled_payment) = match self {
            LoanType::Vehicle => (50_000.0, 1.0, 48, 6, 1302.44),
            LoanType::Property => (300_000.0, 0.65, 360, 24, 2394.05),
            LoanType::Other => (15_000.0, 2.5, 24, 3, 818.38),
        };
        LoanState {
            terms: LoanTerms {
                principal,
                periodic_rate: rate_pct / 100.0,
                total_periods,
            },
            periods_elapsed,
            scheduled_payment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Vehicle => "vehicle",
            LoanType::Property => "property",
            LoanType::Other => "other",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vehicle" => Ok(LoanType::Vehicle),
            "property" => Ok(LoanType::Property),
            "other" => Ok(LoanType::Other),
            other => Err(format!("unknown loan type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_terms_validation() {
        assert!(LoanTerms::new(50_000.0, 0.01, 48).is_ok());
        assert!(LoanTerms::new(50_000.0, 0.0, 48).is_ok());

        let err = LoanTerms::new(0.0, 0.01, 48).unwrap_err();
        assert_eq!(err.kind(), "InvalidTermsError");
        let err = LoanTerms::new(-10.0, 0.01, 48).unwrap_err();
        assert_eq!(err.kind(), "InvalidTermsError");
        let err = LoanTerms::new(50_000.0, -0.01, 48).unwrap_err();
        assert_eq!(err.kind(), "InvalidTermsError");
        let err = LoanTerms::new(50_000.0, 0.01, 0).unwrap_err();
        assert_eq!(err.kind(), "InvalidTermsError");
        let err = LoanTerms::new(f64::NAN, 0.01, 48).unwrap_err();
        assert_eq!(err.kind(), "InvalidTermsError");
    }

    #[test]
    fn test_state_derives_payment() {
        let terms = LoanTerms::from_percent(50_000.0, 1.0, 48).unwrap();
        let state = LoanState::new(terms, 6, None).unwrap();
        assert_relative_eq!(state.scheduled_payment, 1316.6918, epsilon = 1e-3);
        assert_eq!(state.remaining_periods(), 42);
    }

    #[test]
    fn test_state_validation() {
        let terms = LoanTerms::new(50_000.0, 0.01, 48).unwrap();

        let err = LoanState::new(terms, 49, None).unwrap_err();
        assert_eq!(err.kind(), "InvalidStateError");
        let err = LoanState::new(terms, 6, Some(0.0)).unwrap_err();
        assert_eq!(err.kind(), "InvalidStateError");
        let err = LoanState::new(terms, 6, Some(-5.0)).unwrap_err();
        assert_eq!(err.kind(), "InvalidStateError");

        // Fully paid loans are valid states
        let state = LoanState::new(terms, 48, None).unwrap();
        assert_eq!(state.remaining_periods(), 0);
    }

    #[test]
    fn test_presets() {
        let vehicle = LoanType::Vehicle.default_state();
        assert_eq!(vehicle.terms.total_periods, 48);
        assert_eq!(vehicle.periods_elapsed, 6);
        assert_relative_eq!(vehicle.terms.periodic_rate, 0.01);
        assert_relative_eq!(vehicle.scheduled_payment, 1302.44);

        let property = LoanType::Property.default_state();
        assert_relative_eq!(property.terms.periodic_rate, 0.0065);
        assert_eq!(property.terms.total_periods, 360);

        for loan_type in LoanType::ALL {
            assert!(loan_type.default_state().validate().is_ok());
        }
    }

    #[test]
    fn test_loan_type_parsing() {
        assert_eq!("Vehicle".parse::<LoanType>().unwrap(), LoanType::Vehicle);
        assert_eq!(" property ".parse::<LoanType>().unwrap(), LoanType::Property);
        assert!("boat".parse::<LoanType>().is_err());
        assert_eq!(LoanType::Other.to_string(), "other");
    }
}
