//! Amortization engine and its schedule/result types

pub mod formulas;
mod state;
mod schedule;
mod engine;
mod result;

pub use state::ScheduleState;
pub use schedule::{Schedule, ScheduleRow};
pub use engine::{AmortizationEngine, SimulationConfig};
pub use result::{add_periods, PayoffDates, SimulationReport, SimulationResult};
