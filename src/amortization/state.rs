//! Running state of one payoff schedule

/// Balance and running totals while a schedule is advanced period by period
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Periods completed so far (0 before the first payment)
    pub period: u32,

    /// Outstanding balance
    pub balance: f64,

    /// Sum of payments applied
    pub total_paid: f64,

    /// Sum of interest accrued
    pub total_interest: f64,
}

impl ScheduleState {
    /// State before any payment, starting from `balance`
    pub fn opening(balance: f64) -> Self {
        Self {
            period: 0,
            balance,
            total_paid: 0.0,
            total_interest: 0.0,
        }
    }

    /// Accrue one period of interest onto the balance, returning the amount
    pub fn accrue_interest(&mut self, rate: f64) -> f64 {
        let interest = self.balance * rate;
        self.balance += interest;
        self.total_interest += interest;
        interest
    }

    /// Apply a payment, capped at the outstanding balance, and close the
    /// period. Returns the amount actually applied.
    pub fn apply_payment(&mut self, amount_due: f64) -> f64 {
        let applied = amount_due.min(self.balance);
        self.balance -= applied;
        self.total_paid += applied;
        self.period += 1;
        applied
    }

    pub fn is_paid_off(&self, epsilon: f64) -> bool {
        self.balance <= epsilon
    }
}
