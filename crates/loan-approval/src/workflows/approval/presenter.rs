//! Formatting for prediction results: text banner, HTML page, JSON view.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    CreditHistory, Dependents, Education, Gender, PropertyArea, RawApplication, YesNo,
};
use super::predictor::{LoanDecision, PredictionResult};

pub const PAGE_TITLE: &str = "Loan Approval Predictor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerTone {
    Success,
    Failure,
}

/// Success or failure banner shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub tone: BannerTone,
    pub headline: String,
    pub detail: String,
}

impl Banner {
    pub fn text(&self) -> String {
        format!("{}\n{}", self.headline, self.detail)
    }
}

impl From<&PredictionResult> for Banner {
    fn from(result: &PredictionResult) -> Self {
        let (tone, headline) = match result.decision {
            LoanDecision::Approved => (BannerTone::Success, "Loan Approved ✅"),
            LoanDecision::Denied => (BannerTone::Failure, "Loan Denied ❌"),
        };

        Self {
            tone,
            headline: headline.to_string(),
            detail: format!("Approval Probability: {}%", result.probability_display()),
        }
    }
}

/// JSON body returned by the prediction API.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub loan_id: String,
    pub decision: LoanDecision,
    pub approved: bool,
    pub approval_probability: f64,
    pub banner: Banner,
    pub evaluated_at: DateTime<Utc>,
}

impl PredictionView {
    pub fn new(application: &RawApplication, result: &PredictionResult) -> Self {
        Self {
            loan_id: application.loan_id.clone(),
            decision: result.decision,
            approved: result.is_approved(),
            approval_probability: result.rounded_probability(),
            banner: Banner::from(result),
            evaluated_at: Utc::now(),
        }
    }
}

/// What to show beneath the form.
#[derive(Debug, Clone, Copy)]
pub enum PageNotice<'a> {
    None,
    Banner(&'a Banner),
    Error(&'a str),
}

/// Full HTML page: the application form followed by the notice.
pub fn render_page(previous: Option<&RawApplication>, notice: PageNotice<'_>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>💰 {PAGE_TITLE}</title>");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<main>\n");
    let _ = writeln!(html, "<h1>💰 {PAGE_TITLE}</h1>");
    render_form(&mut html, previous);

    match notice {
        PageNotice::None => {}
        PageNotice::Banner(banner) => {
            let class = match banner.tone {
                BannerTone::Success => "banner success",
                BannerTone::Failure => "banner failure",
            };
            let _ = writeln!(
                html,
                "<div class=\"{class}\" role=\"status\"><strong>{}</strong><br>{}</div>",
                escape_html(&banner.headline),
                escape_html(&banner.detail)
            );
        }
        PageNotice::Error(message) => {
            let _ = writeln!(
                html,
                "<div class=\"banner failure\" role=\"alert\">{}</div>",
                escape_html(message)
            );
        }
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, previous: Option<&RawApplication>) {
    html.push_str("<form method=\"post\" action=\"/predict\">\n");

    let loan_id = previous.map(|app| app.loan_id.as_str()).unwrap_or_default();
    let _ = writeln!(
        html,
        "<label>Loan ID <input type=\"text\" name=\"Loan_ID\" value=\"{}\"></label>",
        escape_html(loan_id)
    );

    select(
        html,
        "Gender",
        "Gender",
        Gender::ALL.map(Gender::label),
        previous.map(|app| app.gender.label()),
    );
    select(
        html,
        "Married",
        "Married",
        YesNo::ALL.map(YesNo::label),
        previous.map(|app| app.married.label()),
    );
    select(
        html,
        "Dependents",
        "Dependents",
        Dependents::ALL.map(Dependents::label),
        previous.map(|app| app.dependents.label()),
    );
    select(
        html,
        "Education",
        "Education",
        Education::ALL.map(Education::label),
        previous.map(|app| app.education.label()),
    );
    select(
        html,
        "Self Employed",
        "Self_Employed",
        YesNo::ALL.map(YesNo::label),
        previous.map(|app| app.self_employed.label()),
    );
    number(
        html,
        "Applicant Income",
        "ApplicantIncome",
        previous.map(|app| app.applicant_income),
    );
    number(
        html,
        "Coapplicant Income",
        "CoapplicantIncome",
        previous.map(|app| app.coapplicant_income),
    );
    number(
        html,
        "Loan Amount",
        "LoanAmount",
        previous.map(|app| app.loan_amount),
    );
    number(
        html,
        "Loan Amount Term",
        "Loan_Amount_Term",
        previous.map(|app| app.loan_amount_term),
    );
    select(
        html,
        "Credit History",
        "Credit_History",
        CreditHistory::ALL.map(CreditHistory::label),
        previous.map(|app| app.credit_history.label()),
    );
    select(
        html,
        "Property Area",
        "Property_Area",
        PropertyArea::ALL.map(PropertyArea::label),
        previous.map(|app| app.property_area.label()),
    );

    html.push_str("<button type=\"submit\">Predict Loan Approval</button>\n</form>\n");
}

fn select<const N: usize>(
    html: &mut String,
    label: &str,
    name: &str,
    options: [&'static str; N],
    selected: Option<&str>,
) {
    let _ = write!(html, "<label>{label} <select name=\"{name}\">");
    for option in options {
        let marker = if selected == Some(option) {
            " selected"
        } else {
            ""
        };
        let escaped = escape_html(option);
        let _ = write!(html, "<option value=\"{escaped}\"{marker}>{escaped}</option>");
    }
    html.push_str("</select></label>\n");
}

fn number(html: &mut String, label: &str, name: &str, value: Option<f64>) {
    let value = value.unwrap_or(0.0);
    let _ = writeln!(
        html,
        "<label>{label} <input type=\"number\" name=\"{name}\" min=\"0\" step=\"any\" value=\"{value}\" required></label>"
    );
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const STYLE: &str = "<style>\
body{font-family:sans-serif;margin:0;padding:2rem;}\
main{max-width:40rem;margin:auto;}\
form{display:grid;gap:0.6rem;}\
label{display:flex;justify-content:space-between;gap:1rem;}\
.banner{margin-top:1.5rem;padding:1rem;border-radius:0.4rem;white-space:pre-line;}\
.success{background:#e6f4ea;color:#1e4620;}\
.failure{background:#fdecea;color:#611a15;}\
</style>\n";
