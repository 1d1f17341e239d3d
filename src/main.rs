//! Loan Simulator CLI
//!
//! Command-line interface for running prepayment simulations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::info;

use loan_simulator::{
    scenario::MAX_EXTRA_PAYMENTS, AccelerationSchedule, LoanState, LoanTerms, LoanType,
    PrepaymentPolicy, ScenarioRunner, SimulationConfig, SimulationReport,
};

#[derive(Debug, Parser)]
#[command(name = "loan_simulator", version, about = "Simulate paying a loan off early")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare the scheduled payoff against a prepayment policy
    Simulate {
        #[command(flatten)]
        loan: LoanArgs,

        /// Extra scheduled-payment equivalents paid in each boosted period
        #[arg(long, default_value_t = 1.0)]
        extra: f64,

        /// Number of boosted periods
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        window: i64,

        /// Boost every Nth period instead of the first periods
        #[arg(long, conflicts_with = "spread")]
        every: Option<u32>,

        /// Spread the total extra evenly over the remaining term
        #[arg(long)]
        spread: bool,

        /// Write the accelerated schedule to this CSV file
        #[arg(long)]
        schedule: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run 0..=N extra payments over the same window
    Sweep {
        #[command(flatten)]
        loan: LoanArgs,

        #[arg(long, default_value_t = 1)]
        window: u32,

        #[arg(long, default_value_t = MAX_EXTRA_PAYMENTS)]
        max_extra: u32,
    },
}

#[derive(Debug, Args)]
struct LoanArgs {
    /// Preset supplying defaults: vehicle, property or other
    #[arg(long, default_value = "vehicle")]
    loan_type: LoanType,

    #[arg(long)]
    principal: Option<f64>,

    /// Monthly interest rate in percent (1.0 = 1% per month)
    #[arg(long)]
    rate_pct: Option<f64>,

    #[arg(long)]
    total_periods: Option<u32>,

    #[arg(long)]
    periods_elapsed: Option<u32>,

    /// Payment per period; derived from the terms when omitted
    #[arg(long)]
    payment: Option<f64>,

    /// Date payoff periods are counted from (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl LoanArgs {
    fn to_state(&self) -> Result<LoanState> {
        let preset = self.loan_type.default_state();
        let terms = LoanTerms::new(
            self.principal.unwrap_or(preset.terms.principal),
            self.rate_pct
                .map(|pct| pct / 100.0)
                .unwrap_or(preset.terms.periodic_rate),
            self.total_periods.unwrap_or(preset.terms.total_periods),
        )?;
        let state = LoanState::new(
            terms,
            self.periods_elapsed.unwrap_or(preset.periods_elapsed),
            self.payment,
        )?;
        Ok(state)
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate { loan, extra, window, every, spread, schedule, json } => {
            let state = loan.to_state()?;
            let acceleration = match (every, spread) {
                (Some(interval), _) => AccelerationSchedule::EveryNth { interval },
                (None, true) => AccelerationSchedule::Spread,
                (None, false) => AccelerationSchedule::FrontLoaded,
            };
            let policy = PrepaymentPolicy::from_raw(extra, window)?.with_schedule(acceleration);

            let runner = ScenarioRunner::with_config(SimulationConfig {
                detailed_output: schedule.is_some(),
                ..Default::default()
            });
            let result = runner.run(&state, &policy)?;
            let report = result.report(loan.as_of());

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&state, &policy, &report);
            }

            if let Some(path) = schedule {
                let mut writer = csv::Writer::from_path(&path)
                    .with_context(|| format!("failed to create {}", path))?;
                for row in &report.accelerated_schedule {
                    writer.serialize(row)?;
                }
                writer.flush()?;
                info!("wrote {} schedule rows to {}", report.accelerated_schedule.len(), path);
                println!("\nSchedule written to: {}", path);
            }
        }
        Command::Sweep { loan, window, max_extra } => {
            let state = loan.to_state()?;
            let as_of = loan.as_of();
            let runner = ScenarioRunner::new();

            println!("Loan: {} remaining periods, payment {:.2}", state.remaining_periods(), state.scheduled_payment);
            println!("{:>6} {:>14} {:>14} {:>8} {:>16}", "Extra", "Total Paid", "Saved", "Periods", "Payoff");
            println!("{}", "-".repeat(62));

            for (extra, result) in runner.sweep_extra(&state, window, max_extra) {
                match result {
                    Ok(result) => {
                        let report = result.report(as_of);
                        println!(
                            "{:>6} {:>14.2} {:>14.2} {:>8} {:>16}",
                            extra,
                            report.new_total_paid,
                            report.interest_saved,
                            report.new_payoff_period,
                            report.new_payoff_label,
                        );
                    }
                    Err(err) => println!("{:>6} {}", extra, err),
                }
            }
        }
    }

    Ok(())
}

fn print_report(state: &LoanState, policy: &PrepaymentPolicy, report: &SimulationReport) {
    println!("Loan Simulator v0.1.0");
    println!("=====================\n");

    println!("Loan:");
    println!("  Principal: {:.2}", state.terms.principal);
    println!("  Rate per period: {:.4}%", state.terms.periodic_rate * 100.0);
    println!("  Periods: {} ({} paid)", state.terms.total_periods, state.periods_elapsed);
    println!("  Scheduled payment: {:.2}", report.scheduled_payment);
    println!("  Outstanding balance: {:.2}", report.starting_balance);
    println!();

    println!(
        "Prepayment: {} extra payment(s) over {} period(s), {:?}",
        policy.extra_payments_per_period, policy.acceleration_window_periods, policy.schedule
    );
    println!();

    println!("{:<22} {:>14} {:>14}", "", "As scheduled", "Accelerated");
    println!("{}", "-".repeat(52));
    println!("{:<22} {:>14.2} {:>14.2}", "Total paid", report.original_total_paid, report.new_total_paid);
    println!(
        "{:<22} {:>14.2} {:>14.2}",
        "Total interest", report.original_total_interest, report.new_total_interest
    );
    println!(
        "{:<22} {:>14} {:>14}",
        "Periods to payoff", report.original_payoff_period, report.new_payoff_period
    );
    println!(
        "{:<22} {:>14} {:>14}",
        "Payoff", report.original_payoff_label, report.new_payoff_label
    );
    println!();
    println!("Interest saved: {:.2}", report.interest_saved);
    println!("Periods saved: {}", report.periods_saved);
}
