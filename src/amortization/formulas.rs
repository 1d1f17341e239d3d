//! Closed-form annuity formulas
//!
//! These are the raw formulas with no input validation; the engine validates
//! inputs before calling them.
//!
//! Compounding goes through `ln_1p`/`exp_m1` so that `(1+r)^n - 1` keeps its
//! precision for tiny rates instead of collapsing to zero.

/// `(1+r)^n - 1` without cancellation
fn growth_minus_one(rate: f64, periods: f64) -> f64 {
    (periods * rate.ln_1p()).exp_m1()
}

/// `1 - (1+r)^-n` without cancellation
fn discount_complement(rate: f64, periods: f64) -> f64 {
    -(-periods * rate.ln_1p()).exp_m1()
}

/// Level payment that amortizes `principal` over `periods` at `rate` per period.
///
/// `payment = P * r * (1+r)^n / ((1+r)^n - 1)`, degenerating to `P / n` at a
/// zero rate.
pub fn annuity_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    if rate == 0.0 {
        return principal / periods as f64;
    }
    principal * rate / discount_complement(rate, periods as f64)
}

/// Present value of `periods` level payments of `payment` at `rate`.
///
/// `pv = pmt * (1 - (1+r)^-n) / r`, degenerating to `pmt * n` at a zero rate.
pub fn annuity_present_value(payment: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return payment * periods as f64;
    }
    payment * discount_complement(rate, periods as f64) / rate
}

/// Balance owed after `periods_paid` payments of `payment`, rolled forward
/// from the original principal. Not clamped: negative means overpaid.
pub fn rolled_forward_balance(principal: f64, payment: f64, rate: f64, periods_paid: u32) -> f64 {
    if rate == 0.0 {
        return principal - payment * periods_paid as f64;
    }
    let accrued = growth_minus_one(rate, periods_paid as f64);
    principal * (1.0 + accrued) - payment * accrued / rate
}

/// Round a currency amount to cents. Only used at output boundaries.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
