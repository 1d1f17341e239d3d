//! Load a loan book from CSV
//!
//! Columns mirror the stored loan record: `id, loan_type, installment_value,
//! total_installments, paid_installments, interest_rate,
//! installments_to_prepay`. The interest rate is a monthly percentage.

use anyhow::{Context, Result};
use csv::Reader;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{LoanState, LoanTerms, LoanType};
use crate::amortization::formulas;
use crate::error::{EngineError, EngineResult};
use crate::prepayment::PrepaymentPolicy;

/// Raw CSV row, validated lazily so one bad loan does not reject the book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: String,
    pub loan_type: String,
    pub installment_value: f64,
    pub total_installments: i64,
    pub paid_installments: i64,
    pub interest_rate: f64,
    #[serde(default)]
    pub installments_to_prepay: i64,
}

/// A validated loan from the book, ready to simulate
#[derive(Debug, Clone)]
pub struct LoanRecord {
    pub id: String,
    pub loan_type: LoanType,
    pub state: LoanState,
    pub policy: PrepaymentPolicy,
}

impl LoanRow {
    /// Validate and convert. The stored record has no principal, so it is
    /// taken as the present value of the installment over the full term.
    pub fn to_record(&self) -> EngineResult<LoanRecord> {
        let loan_type = self.loan_type.parse::<LoanType>().unwrap_or_else(|_| {
            warn!("loan {}: unknown loan type {:?}, treating as other", self.id, self.loan_type);
            LoanType::Other
        });

        let total_periods = u32::try_from(self.total_installments)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| {
                EngineError::terms(
                    "total_periods",
                    format!("must be at least 1, got {}", self.total_installments),
                )
            })?;

        let periods_elapsed = u32::try_from(self.paid_installments).map_err(|_| {
            EngineError::state(
                "periods_elapsed",
                format!("must be non-negative, got {}", self.paid_installments),
            )
        })?;

        if !self.installment_value.is_finite() || self.installment_value <= 0.0 {
            return Err(EngineError::state(
                "scheduled_payment",
                format!("must be a positive amount, got {}", self.installment_value),
            ));
        }

        let periodic_rate = self.interest_rate / 100.0;
        let principal = formulas::annuity_present_value(self.installment_value, periodic_rate, total_periods);
        let terms = LoanTerms::new(principal, periodic_rate, total_periods)?;
        let state = LoanState::new(terms, periods_elapsed, Some(self.installment_value))?;

        // Each prepaid installment doubles the payment in one early period
        let policy = PrepaymentPolicy::from_raw(1.0, self.installments_to_prepay)?;

        Ok(LoanRecord {
            id: self.id.clone(),
            loan_type,
            state,
            policy,
        })
    }
}

/// Load all rows from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRow>> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)
        .with_context(|| format!("failed to open loan book {}", path.display()))?;
    collect_rows(reader)
}

/// Load rows from any reader (e.g., string buffer, request body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRow>> {
    collect_rows(Reader::from_reader(reader))
}

fn collect_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRow>> {
    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: LoanRow = result.with_context(|| format!("malformed loan row {}", line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BOOK: &str = "\
id,loan_type,installment_value,total_installments,paid_installments,interest_rate,installments_to_prepay
car-1,vehicle,1316.69,48,6,1.0,1
home-1,property,2159.61,360,24,0.65,12
bad-1,other,818.38,24,30,2.5,0
odd-1,boat,500.0,12,0,0.0,0
";

    #[test]
    fn test_load_from_reader() {
        let rows = load_loans_from_reader(BOOK.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].id, "car-1");
        assert_eq!(rows[1].installments_to_prepay, 12);
    }

    #[test]
    fn test_row_to_record() {
        let rows = load_loans_from_reader(BOOK.as_bytes()).unwrap();

        let car = rows[0].to_record().unwrap();
        assert_eq!(car.loan_type, LoanType::Vehicle);
        assert_relative_eq!(car.state.terms.principal, 50_000.0, epsilon = 0.1);
        assert_eq!(car.state.periods_elapsed, 6);
        assert_eq!(car.policy.acceleration_window_periods, 1);
        assert_relative_eq!(car.policy.extra_payments_per_period, 1.0);

        // More installments paid than exist
        let err = rows[2].to_record().unwrap_err();
        assert_eq!(err.kind(), "InvalidStateError");

        // Unknown type falls back to other; zero rate is fine
        let odd = rows[3].to_record().unwrap();
        assert_eq!(odd.loan_type, LoanType::Other);
        assert_relative_eq!(odd.state.terms.principal, 6000.0);
    }

    #[test]
    fn test_invalid_rows() {
        let mut row = LoanRow {
            id: "x".into(),
            loan_type: "vehicle".into(),
            installment_value: 100.0,
            total_installments: 12,
            paid_installments: 0,
            interest_rate: 1.0,
            installments_to_prepay: 0,
        };
        assert!(row.to_record().is_ok());

        row.total_installments = 0;
        assert_eq!(row.to_record().unwrap_err().kind(), "InvalidTermsError");
        row.total_installments = 12;

        row.interest_rate = -1.0;
        assert_eq!(row.to_record().unwrap_err().kind(), "InvalidTermsError");
        row.interest_rate = 1.0;

        row.installments_to_prepay = -2;
        assert_eq!(row.to_record().unwrap_err().kind(), "InvalidPolicyError");
        row.installments_to_prepay = 0;

        row.paid_installments = -1;
        assert_eq!(row.to_record().unwrap_err().kind(), "InvalidStateError");
        row.paid_installments = 0;

        row.installment_value = 0.0;
        assert_eq!(row.to_record().unwrap_err().kind(), "InvalidStateError");
    }

    #[test]
    fn test_malformed_csv_is_error() {
        let text = "id,loan_type,installment_value,total_installments,paid_installments,interest_rate\n\
                    a,vehicle,not-a-number,12,0,1.0\n";
        assert!(load_loans_from_reader(text.as_bytes()).is_err());
    }
}
