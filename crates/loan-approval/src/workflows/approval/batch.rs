use std::io::Read;

use tracing::warn;

use super::domain::RawApplication;
use super::predictor::{LoanDecision, PredictionResult};
use super::service::{LoanApprovalPipeline, PipelineError};

/// Outcome for one CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// 1-based line on which the record starts, header included.
    pub line: u64,
    pub loan_id: String,
    pub outcome: Result<PredictionResult, BatchRowError>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchRowError {
    #[error("unreadable row: {0}")]
    Parse(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    pub fn approved(&self) -> usize {
        self.count(|result| result.decision == LoanDecision::Approved)
    }

    pub fn denied(&self) -> usize {
        self.count(|result| result.decision == LoanDecision::Denied)
    }

    pub fn failed(&self) -> usize {
        self.rows.iter().filter(|row| row.outcome.is_err()).count()
    }

    fn count(&self, predicate: impl Fn(&PredictionResult) -> bool) -> usize {
        self.rows
            .iter()
            .filter(|row| row.outcome.as_ref().map(&predicate).unwrap_or(false))
            .count()
    }
}

/// Score every row of a CSV export whose headers use the form field names.
///
/// Rows that fail to parse or evaluate are reported individually; only an
/// unreadable header aborts the batch.
pub fn score_csv<R: Read>(
    pipeline: &LoanApprovalPipeline,
    reader: R,
) -> Result<BatchReport, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let loan_id_index = headers.iter().position(|header| header == "Loan_ID");

    let mut report = BatchReport::default();
    let mut next_line = 2;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map_or(next_line, |position| position.line());
                next_line = line + 1;
                warn!(line, error = %err, "skipping unreadable csv record");
                report.rows.push(BatchRow {
                    line,
                    loan_id: String::new(),
                    outcome: Err(BatchRowError::Parse(err.to_string())),
                });
                continue;
            }
        };

        let line = record.position().map_or(next_line, |position| position.line());
        next_line = line + 1;

        let loan_id = loan_id_index
            .and_then(|position| record.get(position))
            .unwrap_or_default()
            .to_string();

        let outcome = match record.deserialize::<RawApplication>(Some(&headers)) {
            Ok(application) => pipeline.evaluate(&application).map_err(BatchRowError::from),
            Err(err) => Err(BatchRowError::Parse(err.to_string())),
        };

        report.rows.push(BatchRow {
            line,
            loan_id,
            outcome,
        });
    }

    Ok(report)
}
