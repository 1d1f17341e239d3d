//! Run prepayment simulations for every loan in a CSV loan book
//!
//! Usage: cargo run --bin run_book -- loans.csv [--output book_report.csv]
//!
//! Loans that fail validation or never amortize are reported in the output
//! with their error kind; they do not stop the batch.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use loan_simulator::loan::{load_loans, LoanRecord};
use loan_simulator::{EngineResult, ScenarioRunner, SimulationResult};

#[derive(Debug, Parser)]
#[command(name = "run_book", about = "Simulate prepayment for a CSV loan book")]
struct Cli {
    /// Loan book CSV
    input: PathBuf,

    /// Report CSV to write
    #[arg(long, default_value = "book_report.csv")]
    output: PathBuf,

    /// Date payoff periods are counted from (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

/// One output line per loan
#[derive(Debug, Default, Serialize)]
struct ReportRow {
    id: String,
    loan_type: String,
    status: String,
    starting_balance: Option<f64>,
    original_total_paid: Option<f64>,
    new_total_paid: Option<f64>,
    interest_saved: Option<f64>,
    original_payoff_period: Option<u32>,
    new_payoff_period: Option<u32>,
    periods_saved: Option<u32>,
    new_payoff_date: Option<NaiveDate>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    let start = Instant::now();
    println!("Loading loans from {}...", cli.input.display());
    let rows = load_loans(&cli.input)?;
    println!("Loaded {} loans in {:?}", rows.len(), start.elapsed());

    // Validation failures are carried through to the report
    let mut report_rows: Vec<ReportRow> = Vec::with_capacity(rows.len());
    let mut records: Vec<LoanRecord> = Vec::with_capacity(rows.len());
    let mut slots: Vec<Option<usize>> = Vec::with_capacity(rows.len());

    for row in &rows {
        match row.to_record() {
            Ok(record) => {
                slots.push(Some(records.len()));
                records.push(record);
                report_rows.push(ReportRow::default());
            }
            Err(err) => {
                warn!("loan {} rejected: {}", row.id, err);
                slots.push(None);
                report_rows.push(ReportRow {
                    id: row.id.clone(),
                    loan_type: row.loan_type.clone(),
                    status: err.kind().to_string(),
                    error: Some(err.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    println!("Running simulations...");
    let sim_start = Instant::now();
    let runner = ScenarioRunner::new();
    let outcomes = runner.run_book(&records);
    println!("Simulations complete in {:?}", sim_start.elapsed());

    for (slot, report_row) in slots.iter().zip(report_rows.iter_mut()) {
        if let Some(index) = slot {
            let outcome = &outcomes[*index];
            *report_row = build_row(&outcome.id, outcome.loan_type.as_str(), &outcome.result, as_of);
        }
    }

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    for row in &report_rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let failed = report_rows.iter().filter(|r| r.status != "ok").count();
    let saved: f64 = report_rows.iter().filter_map(|r| r.interest_saved).sum();
    info!("{} loans simulated, {} failed", report_rows.len() - failed, failed);

    println!("\nSummary:");
    println!("  Loans: {}", report_rows.len());
    println!("  Failed: {}", failed);
    println!("  Total interest saved: {:.2}", saved);
    println!("\nReport written to: {}", cli.output.display());

    Ok(())
}

fn build_row(
    id: &str,
    loan_type: &str,
    result: &EngineResult<SimulationResult>,
    as_of: NaiveDate,
) -> ReportRow {
    match result {
        Ok(result) => {
            let report = result.report(as_of);
            ReportRow {
                id: id.to_string(),
                loan_type: loan_type.to_string(),
                status: "ok".to_string(),
                starting_balance: Some(report.starting_balance),
                original_total_paid: Some(report.original_total_paid),
                new_total_paid: Some(report.new_total_paid),
                interest_saved: Some(report.interest_saved),
                original_payoff_period: Some(report.original_payoff_period),
                new_payoff_period: Some(report.new_payoff_period),
                periods_saved: Some(report.periods_saved),
                new_payoff_date: Some(report.new_payoff_date),
                error: None,
            }
        }
        Err(err) => ReportRow {
            id: id.to_string(),
            loan_type: loan_type.to_string(),
            status: err.kind().to_string(),
            error: Some(err.to_string()),
            ..Default::default()
        },
    }
}
