use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::RATIO_EPSILON;

/// Applicant attributes exactly as collected by the form.
///
/// Field names on the wire match the training data headers so the same struct
/// reads form posts, JSON bodies and CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
    /// Informational only; never reaches the model.
    #[serde(rename = "Loan_ID", default)]
    pub loan_id: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Married")]
    pub married: YesNo,
    #[serde(rename = "Dependents")]
    pub dependents: Dependents,
    #[serde(rename = "Education")]
    pub education: Education,
    #[serde(rename = "Self_Employed")]
    pub self_employed: YesNo,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    #[serde(rename = "Credit_History")]
    pub credit_history: CreditHistory,
    #[serde(rename = "Property_Area")]
    pub property_area: PropertyArea,
}

impl RawApplication {
    /// Reject numeric inputs the feature transforms cannot take: negative or
    /// non-finite fields, and sums or ratios that overflow once derived.
    pub fn validate(&self) -> Result<(), NumericDomainError> {
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(NumericDomainError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(NumericDomainError::Negative { field, value });
            }
        }

        let total_income = self.applicant_income + self.coapplicant_income;
        if !total_income.is_finite() {
            return Err(NumericDomainError::NotFinite {
                field: NumericField::TotalIncome,
            });
        }
        if !(self.loan_amount / (total_income + RATIO_EPSILON)).is_finite() {
            return Err(NumericDomainError::NotFinite {
                field: NumericField::LoanIncomeRatio,
            });
        }
        Ok(())
    }

    fn numeric_fields(&self) -> [(NumericField, f64); 4] {
        [
            (NumericField::ApplicantIncome, self.applicant_income),
            (NumericField::CoapplicantIncome, self.coapplicant_income),
            (NumericField::LoanAmount, self.loan_amount),
            (NumericField::LoanAmountTerm, self.loan_amount_term),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Answer for the `Married` and `Self_Employed` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::Yes, YesNo::No];

    pub const fn label(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dependents {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3+", alias = "3")]
    ThreeOrMore,
}

impl Dependents {
    pub const ALL: [Dependents; 4] = [
        Dependents::Zero,
        Dependents::One,
        Dependents::Two,
        Dependents::ThreeOrMore,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Dependents::Zero => "0",
            Dependents::One => "1",
            Dependents::Two => "2",
            Dependents::ThreeOrMore => "3+",
        }
    }

    /// Numeric value used by the model; `3+` collapses to 3.
    pub const fn count(self) -> u8 {
        match self {
            Dependents::Zero => 0,
            Dependents::One => 1,
            Dependents::Two => 2,
            Dependents::ThreeOrMore => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Education {
    Graduate,
    #[serde(rename = "Not Graduate")]
    NotGraduate,
}

impl Education {
    pub const ALL: [Education; 2] = [Education::Graduate, Education::NotGraduate];

    pub const fn label(self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::NotGraduate => "Not Graduate",
        }
    }
}

/// Whether the applicant's credit history meets lending guidelines (`1`) or not (`0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditHistory {
    #[serde(rename = "0", alias = "0.0")]
    BelowGuidelines,
    #[serde(rename = "1", alias = "1.0")]
    MeetsGuidelines,
}

impl CreditHistory {
    pub const ALL: [CreditHistory; 2] = [
        CreditHistory::BelowGuidelines,
        CreditHistory::MeetsGuidelines,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CreditHistory::BelowGuidelines => "0",
            CreditHistory::MeetsGuidelines => "1",
        }
    }

    pub const fn value(self) -> f64 {
        match self {
            CreditHistory::BelowGuidelines => 0.0,
            CreditHistory::MeetsGuidelines => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyArea {
    Urban,
    Semiurban,
    Rural,
}

impl PropertyArea {
    pub const ALL: [PropertyArea; 3] = [
        PropertyArea::Urban,
        PropertyArea::Semiurban,
        PropertyArea::Rural,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyArea::Urban => "Urban",
            PropertyArea::Semiurban => "Semiurban",
            PropertyArea::Rural => "Rural",
        }
    }
}

/// Numeric form fields, and the derived sums over them, subject to domain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericField {
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    TotalIncome,
    LoanIncomeRatio,
}

impl NumericField {
    pub const fn label(self) -> &'static str {
        match self {
            NumericField::ApplicantIncome => "ApplicantIncome",
            NumericField::CoapplicantIncome => "CoapplicantIncome",
            NumericField::LoanAmount => "LoanAmount",
            NumericField::LoanAmountTerm => "Loan_Amount_Term",
            NumericField::TotalIncome => "Total_Income",
            NumericField::LoanIncomeRatio => "Loan_Income_Ratio",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric input outside the range the feature transforms accept.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericDomainError {
    #[error("{field} must be zero or greater (found {value})")]
    Negative { field: NumericField, value: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: NumericField },
}
