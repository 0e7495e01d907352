use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::approval::domain::{
    CreditHistory, Dependents, Education, Gender, PropertyArea, RawApplication, YesNo,
};
use crate::workflows::approval::{ArtifactBundle, LoanApprovalPipeline};

pub(super) const MODEL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../artifacts/loan_model.json"
));
pub(super) const SCALER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../artifacts/scaler.json"
));
pub(super) const ENCODERS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../artifacts/encoders.json"
));

pub(super) fn bundle() -> ArtifactBundle {
    bundle_with(MODEL, SCALER, ENCODERS)
}

pub(super) fn bundle_with(model: &str, scaler: &str, encoders: &str) -> ArtifactBundle {
    ArtifactBundle::from_readers(model.as_bytes(), scaler.as_bytes(), encoders.as_bytes())
        .expect("fixture artifacts load")
}

pub(super) fn pipeline() -> LoanApprovalPipeline {
    LoanApprovalPipeline::new(Arc::new(bundle()))
}

/// Graduate salaried applicant with good credit in an urban area.
pub(super) fn application() -> RawApplication {
    RawApplication {
        loan_id: "LP001015".to_string(),
        gender: Gender::Male,
        married: YesNo::Yes,
        dependents: Dependents::Zero,
        education: Education::Graduate,
        self_employed: YesNo::No,
        applicant_income: 5000.0,
        coapplicant_income: 0.0,
        loan_amount: 150.0,
        loan_amount_term: 360.0,
        credit_history: CreditHistory::MeetsGuidelines,
        property_area: PropertyArea::Urban,
    }
}

pub(super) fn form_body(application: &RawApplication) -> String {
    format!(
        "Loan_ID={}&Gender={}&Married={}&Dependents={}&Education={}&Self_Employed={}\
         &ApplicantIncome={}&CoapplicantIncome={}&LoanAmount={}&Loan_Amount_Term={}\
         &Credit_History={}&Property_Area={}",
        application.loan_id,
        application.gender.label(),
        application.married.label(),
        application.dependents.label().replace('+', "%2B"),
        application.education.label().replace(' ', "+"),
        application.self_employed.label(),
        application.applicant_income,
        application.coapplicant_income,
        application.loan_amount,
        application.loan_amount_term,
        application.credit_history.label(),
        application.property_area.label(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
