//! Prepayment policies

mod policy;

pub use policy::{AccelerationSchedule, PrepaymentPolicy};
