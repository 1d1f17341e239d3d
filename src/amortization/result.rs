//! Simulation results and the rounded report handed to callers

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::formulas::round_currency;
use super::schedule::ScheduleRow;

/// Comparison of the scheduled payoff against the accelerated payoff.
///
/// Currency fields carry full precision; use [`SimulationResult::report`] at
/// the output boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Balance both schedules start from
    pub starting_balance: f64,

    /// Scheduled payment per period
    pub scheduled_payment: f64,

    pub original_total_paid: f64,
    pub new_total_paid: f64,
    pub original_total_interest: f64,
    pub new_total_interest: f64,

    /// `original_total_paid - new_total_paid`
    pub interest_saved: f64,

    pub original_payoff_period: u32,
    pub new_payoff_period: u32,
    pub periods_saved: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub baseline_schedule: Vec<ScheduleRow>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accelerated_schedule: Vec<ScheduleRow>,
}

/// Calendar payoff dates for both schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffDates {
    pub original: NaiveDate,
    pub new: NaiveDate,
}

/// Output-boundary view of a simulation: currency rounded to cents, payoff
/// dates resolved against an as-of date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub starting_balance: f64,
    pub scheduled_payment: f64,
    pub original_total_paid: f64,
    pub new_total_paid: f64,
    pub interest_saved: f64,
    pub original_total_interest: f64,
    pub new_total_interest: f64,
    pub original_payoff_period: u32,
    pub new_payoff_period: u32,
    pub periods_saved: u32,
    pub as_of: NaiveDate,
    pub original_payoff_date: NaiveDate,
    pub new_payoff_date: NaiveDate,
    /// e.g. "March 2030"
    pub original_payoff_label: String,
    pub new_payoff_label: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accelerated_schedule: Vec<ScheduleRow>,
}

/// Add whole calendar months, clamping to the end of shorter months
pub fn add_periods(as_of: NaiveDate, periods: u32) -> NaiveDate {
    as_of
        .checked_add_months(Months::new(periods))
        .unwrap_or(NaiveDate::MAX)
}

fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

impl SimulationResult {
    /// Payoff dates, counting each period as one calendar month from `as_of`
    pub fn payoff_dates(&self, as_of: NaiveDate) -> PayoffDates {
        PayoffDates {
            original: add_periods(as_of, self.original_payoff_period),
            new: add_periods(as_of, self.new_payoff_period),
        }
    }

    /// Rounded report for presentation
    pub fn report(&self, as_of: NaiveDate) -> SimulationReport {
        let dates = self.payoff_dates(as_of);
        SimulationReport {
            starting_balance: round_currency(self.starting_balance),
            scheduled_payment: round_currency(self.scheduled_payment),
            original_total_paid: round_currency(self.original_total_paid),
            new_total_paid: round_currency(self.new_total_paid),
            interest_saved: round_currency(self.interest_saved),
            original_total_interest: round_currency(self.original_total_interest),
            new_total_interest: round_currency(self.new_total_interest),
            original_payoff_period: self.original_payoff_period,
            new_payoff_period: self.new_payoff_period,
            periods_saved: self.periods_saved,
            as_of,
            original_payoff_date: dates.original,
            new_payoff_date: dates.new,
            original_payoff_label: month_label(dates.original),
            new_payoff_label: month_label(dates.new),
            accelerated_schedule: self.accelerated_schedule.iter().map(ScheduleRow::rounded).collect(),
        }
    }
}
