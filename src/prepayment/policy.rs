//! Prepayment policy: how much extra is paid, and in which periods

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which periods of the remaining schedule receive the extra payment.
///
/// Front-loading matches how the simulator has always behaved. It is a
/// product choice, not something the amortization math requires, so the
/// alternatives are offered alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccelerationSchedule {
    /// Extra applied in the first `window` periods
    #[default]
    FrontLoaded,
    /// Extra applied every `interval`-th period until `window` boosted
    /// payments have been made
    EveryNth { interval: u32 },
    /// Total extra (`extra * window` payments) spread evenly over the
    /// remaining term
    Spread,
}

/// Recurring extra principal, expressed in multiples of the scheduled payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentPolicy {
    /// Additional scheduled-payment equivalents paid in a boosted period
    pub extra_payments_per_period: f64,

    /// Number of boosted periods; 0 disables acceleration
    pub acceleration_window_periods: u32,

    #[serde(default)]
    pub schedule: AccelerationSchedule,
}

impl PrepaymentPolicy {
    /// Front-loaded policy
    pub fn new(extra_payments_per_period: f64, acceleration_window_periods: u32) -> EngineResult<Self> {
        let policy = Self {
            extra_payments_per_period,
            acceleration_window_periods,
            schedule: AccelerationSchedule::FrontLoaded,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Build from raw caller input where the window arrives as a signed count
    pub fn from_raw(extra_payments_per_period: f64, acceleration_window_periods: i64) -> EngineResult<Self> {
        let window = u32::try_from(acceleration_window_periods).map_err(|_| {
            EngineError::policy(
                "acceleration_window_periods",
                format!("must be a non-negative count, got {}", acceleration_window_periods),
            )
        })?;
        Self::new(extra_payments_per_period, window)
    }

    /// Pay exactly as scheduled
    pub fn none() -> Self {
        Self {
            extra_payments_per_period: 0.0,
            acceleration_window_periods: 0,
            schedule: AccelerationSchedule::FrontLoaded,
        }
    }

    pub fn with_schedule(mut self, schedule: AccelerationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.extra_payments_per_period.is_finite() || self.extra_payments_per_period < 0.0 {
            return Err(EngineError::policy(
                "extra_payments_per_period",
                format!("must be non-negative, got {}", self.extra_payments_per_period),
            ));
        }
        if let AccelerationSchedule::EveryNth { interval: 0 } = self.schedule {
            return Err(EngineError::policy("interval", "must be at least 1"));
        }
        Ok(())
    }

    /// True when no period is ever boosted
    pub fn is_none(&self) -> bool {
        self.extra_payments_per_period == 0.0 || self.acceleration_window_periods == 0
    }

    /// Factor applied to the scheduled payment in `period_index` (0-based from
    /// the start of the simulation)
    pub fn payment_multiplier(&self, period_index: u32, remaining_periods: u32) -> f64 {
        if self.is_none() {
            return 1.0;
        }
        let extra = self.extra_payments_per_period;
        let window = self.acceleration_window_periods;

        match self.schedule {
            AccelerationSchedule::FrontLoaded => {
                if period_index < window {
                    1.0 + extra
                } else {
                    1.0
                }
            }
            AccelerationSchedule::EveryNth { interval } => {
                let interval = interval.max(1);
                if period_index % interval == 0 && period_index / interval < window {
                    1.0 + extra
                } else {
                    1.0
                }
            }
            AccelerationSchedule::Spread => {
                if remaining_periods == 0 || period_index >= remaining_periods {
                    1.0
                } else {
                    1.0 + extra * window as f64 / remaining_periods as f64
                }
            }
        }
    }
}

impl Default for PrepaymentPolicy {
    fn default() -> Self {
        Self::none()
    }
}
