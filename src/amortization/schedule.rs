//! Per-period schedule output

use serde::{Deserialize, Serialize};

use super::formulas::round_currency;

/// One period of a payoff schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period number from now (1-indexed)
    pub period: u32,
    pub opening_balance: f64,
    pub interest: f64,
    pub scheduled_payment: f64,
    /// Amount due above the scheduled payment
    pub extra_payment: f64,
    /// Amount actually applied (capped at the balance in the final period)
    pub payment: f64,
    pub principal_paid: f64,
    pub closing_balance: f64,
}

impl ScheduleRow {
    /// Copy with currency fields rounded to cents
    pub fn rounded(&self) -> Self {
        Self {
            period: self.period,
            opening_balance: round_currency(self.opening_balance),
            interest: round_currency(self.interest),
            scheduled_payment: round_currency(self.scheduled_payment),
            extra_payment: round_currency(self.extra_payment),
            payment: round_currency(self.payment),
            principal_paid: round_currency(self.principal_paid),
            closing_balance: round_currency(self.closing_balance),
        }
    }
}

/// A completed payoff schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Period rows; empty unless detailed output was requested
    pub rows: Vec<ScheduleRow>,

    /// Sum of all payments
    pub total_paid: f64,

    /// Sum of all interest accrued
    pub total_interest: f64,

    /// Periods from now until the balance reached zero
    pub payoff_period: u32,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: ScheduleRow) {
        self.rows.push(row);
    }
}
