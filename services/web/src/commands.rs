use clap::Args;
use loan_approval::config::{AppConfig, ArtifactConfig};
use loan_approval::error::AppError;
use loan_approval::telemetry;
use loan_approval::workflows::approval::{
    score_csv, ArtifactBundle, Banner, BatchReport, BatchRow, CreditHistory, Dependents,
    Education, Gender, LoanApprovalPipeline, PropertyArea, RawApplication, YesNo,
};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Informational identifier echoed in logs
    #[arg(long, default_value = "")]
    pub(crate) loan_id: String,
    /// Male or Female
    #[arg(long, value_parser = parse_choice::<Gender>)]
    pub(crate) gender: Gender,
    /// Yes or No
    #[arg(long, value_parser = parse_choice::<YesNo>)]
    pub(crate) married: YesNo,
    /// 0, 1, 2 or 3+
    #[arg(long, value_parser = parse_choice::<Dependents>)]
    pub(crate) dependents: Dependents,
    /// Graduate or "Not Graduate"
    #[arg(long, value_parser = parse_choice::<Education>)]
    pub(crate) education: Education,
    /// Yes or No
    #[arg(long, value_parser = parse_choice::<YesNo>)]
    pub(crate) self_employed: YesNo,
    #[arg(long)]
    pub(crate) applicant_income: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) coapplicant_income: f64,
    /// Loan amount in thousands
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Term in months
    #[arg(long, default_value_t = 360.0)]
    pub(crate) loan_amount_term: f64,
    /// 1 when the credit history meets guidelines, otherwise 0
    #[arg(long, value_parser = parse_choice::<CreditHistory>)]
    pub(crate) credit_history: CreditHistory,
    /// Urban, Semiurban or Rural
    #[arg(long, value_parser = parse_choice::<PropertyArea>)]
    pub(crate) property_area: PropertyArea,
    /// Directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifact_dir: Option<PathBuf>,
}

impl PredictArgs {
    pub(crate) fn application(&self) -> RawApplication {
        RawApplication {
            loan_id: self.loan_id.clone(),
            gender: self.gender,
            married: self.married,
            dependents: self.dependents,
            education: self.education,
            self_employed: self.self_employed,
            applicant_income: self.applicant_income,
            coapplicant_income: self.coapplicant_income,
            loan_amount: self.loan_amount,
            loan_amount_term: self.loan_amount_term,
            credit_history: self.credit_history,
            property_area: self.property_area,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with the form field names as headers
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifact_dir: Option<PathBuf>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(args.artifact_dir.clone())?;
    let result = pipeline.evaluate(&args.application())?;

    println!("{}", Banner::from(&result).text());
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(args.artifact_dir)?;
    let file = File::open(&args.csv)?;
    let report = score_csv(&pipeline, BufReader::new(file))?;

    for row in &report.rows {
        println!("{}", format_row(row));
    }
    println!("\n{}", summary_line(&report));
    Ok(())
}

fn load_pipeline(artifact_dir: Option<PathBuf>) -> Result<LoanApprovalPipeline, AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    if let Some(dir) = artifact_dir {
        config.artifacts = ArtifactConfig::new(dir);
    }

    let bundle = ArtifactBundle::load(&config.artifacts)?;
    Ok(LoanApprovalPipeline::new(Arc::new(bundle)))
}

fn format_row(row: &BatchRow) -> String {
    let loan_id = if row.loan_id.is_empty() {
        format!("line {}", row.line)
    } else {
        row.loan_id.clone()
    };

    match &row.outcome {
        Ok(result) => format!(
            "{loan_id} | {} | {}%",
            result.decision.label(),
            result.probability_display()
        ),
        Err(err) => format!("{loan_id} | error | {err}"),
    }
}

fn summary_line(report: &BatchReport) -> String {
    format!(
        "Scored {} applications: {} approved, {} denied, {} failed",
        report.rows.len(),
        report.approved(),
        report.denied(),
        report.failed()
    )
}

/// Parse a CLI value using the same labels the form and CSV exports use.
fn parse_choice<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|err| format!("'{raw}' is not an accepted value ({err})"))
}
