//! Error taxonomy for the amortization engine

use thiserror::Error;

/// Failures reported by engine operations.
///
/// All variants are pure-value failures: no partial result accompanies them
/// and the engine never retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid loan terms: {field} {reason}")]
    InvalidTerms { field: &'static str, reason: String },

    #[error("invalid loan state: {field} {reason}")]
    InvalidState { field: &'static str, reason: String },

    #[error("invalid prepayment policy: {field} {reason}")]
    InvalidPolicy { field: &'static str, reason: String },

    #[error(
        "payment of {payment:.2} will never pay off the loan at this rate \
         (first-period interest {interest:.2}, gave up after {iterations} periods)"
    )]
    NonConvergence {
        iterations: u32,
        payment: f64,
        interest: f64,
    },
}

impl EngineError {
    pub(crate) fn terms(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidTerms { field, reason: reason.into() }
    }

    pub(crate) fn state(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidState { field, reason: reason.into() }
    }

    pub(crate) fn policy(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidPolicy { field, reason: reason.into() }
    }

    /// Short machine-readable tag, used in error bodies and CSV reports
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidTerms { .. } => "InvalidTermsError",
            EngineError::InvalidState { .. } => "InvalidStateError",
            EngineError::InvalidPolicy { .. } => "InvalidPolicyError",
            EngineError::NonConvergence { .. } => "NonConvergenceError",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
