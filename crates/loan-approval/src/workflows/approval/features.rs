//! Engineered features derived from a raw application.
//!
//! The scaler and classifier were fit on data carrying these exact transforms,
//! so the formulas here are part of the artifact contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Education, Gender, PropertyArea, RawApplication, YesNo};

/// Guards `Loan_Income_Ratio` against a zero total income.
pub const RATIO_EPSILON: f64 = 1e-5;

/// Every column the pipeline can hand to the scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureColumn {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditHistory,
    PropertyArea,
    TotalIncome,
    LoanIncomeRatio,
    HasDependents,
    LoanAmountLog,
    TotalIncomeLog,
}

impl FeatureColumn {
    /// Column order of the frame the original artifacts were fit on.
    pub const TRAINING_ORDER: [FeatureColumn; 16] = [
        FeatureColumn::Gender,
        FeatureColumn::Married,
        FeatureColumn::Dependents,
        FeatureColumn::Education,
        FeatureColumn::SelfEmployed,
        FeatureColumn::ApplicantIncome,
        FeatureColumn::CoapplicantIncome,
        FeatureColumn::LoanAmount,
        FeatureColumn::LoanAmountTerm,
        FeatureColumn::CreditHistory,
        FeatureColumn::PropertyArea,
        FeatureColumn::TotalIncome,
        FeatureColumn::LoanIncomeRatio,
        FeatureColumn::HasDependents,
        FeatureColumn::LoanAmountLog,
        FeatureColumn::TotalIncomeLog,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FeatureColumn::Gender => "Gender",
            FeatureColumn::Married => "Married",
            FeatureColumn::Dependents => "Dependents",
            FeatureColumn::Education => "Education",
            FeatureColumn::SelfEmployed => "Self_Employed",
            FeatureColumn::ApplicantIncome => "ApplicantIncome",
            FeatureColumn::CoapplicantIncome => "CoapplicantIncome",
            FeatureColumn::LoanAmount => "LoanAmount",
            FeatureColumn::LoanAmountTerm => "Loan_Amount_Term",
            FeatureColumn::CreditHistory => "Credit_History",
            FeatureColumn::PropertyArea => "Property_Area",
            FeatureColumn::TotalIncome => "Total_Income",
            FeatureColumn::LoanIncomeRatio => "Loan_Income_Ratio",
            FeatureColumn::HasDependents => "Has_Dependents",
            FeatureColumn::LoanAmountLog => "LoanAmount_log",
            FeatureColumn::TotalIncomeLog => "Total_Income_log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TRAINING_ORDER
            .into_iter()
            .find(|column| column.name() == name.trim())
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The five columns that go through a fitted label encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalColumn {
    Gender,
    Married,
    Education,
    SelfEmployed,
    PropertyArea,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 5] = [
        CategoricalColumn::Gender,
        CategoricalColumn::Married,
        CategoricalColumn::Education,
        CategoricalColumn::SelfEmployed,
        CategoricalColumn::PropertyArea,
    ];

    pub const fn feature(self) -> FeatureColumn {
        match self {
            CategoricalColumn::Gender => FeatureColumn::Gender,
            CategoricalColumn::Married => FeatureColumn::Married,
            CategoricalColumn::Education => FeatureColumn::Education,
            CategoricalColumn::SelfEmployed => FeatureColumn::SelfEmployed,
            CategoricalColumn::PropertyArea => FeatureColumn::PropertyArea,
        }
    }

    pub const fn name(self) -> &'static str {
        self.feature().name()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.name() == name.trim())
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw application plus the derived numeric features, before encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub gender: Gender,
    pub married: YesNo,
    pub dependents: u8,
    pub education: Education,
    pub self_employed: YesNo,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit_history: f64,
    pub property_area: PropertyArea,
    pub total_income: f64,
    pub loan_income_ratio: f64,
    pub has_dependents: u8,
    pub loan_amount_log: f64,
    pub total_income_log: f64,
}

impl FeatureVector {
    /// Derive the engineered features. Inputs are expected to have passed
    /// `RawApplication::validate`.
    pub fn derive(application: &RawApplication) -> Self {
        let dependents = application.dependents.count();

        let total_income = application.applicant_income + application.coapplicant_income;
        let loan_income_ratio = application.loan_amount / (total_income + RATIO_EPSILON);
        let has_dependents = u8::from(dependents > 0);
        let loan_amount_log = (application.loan_amount + 1.0).ln();
        let total_income_log = (total_income + 1.0).ln();

        Self {
            gender: application.gender,
            married: application.married,
            dependents,
            education: application.education,
            self_employed: application.self_employed,
            applicant_income: application.applicant_income,
            coapplicant_income: application.coapplicant_income,
            loan_amount: application.loan_amount,
            loan_amount_term: application.loan_amount_term,
            credit_history: application.credit_history.value(),
            property_area: application.property_area,
            total_income,
            loan_income_ratio,
            has_dependents,
            loan_amount_log,
            total_income_log,
        }
    }

    /// Category label for an encoded column, as the encoder saw it during training.
    pub fn category(&self, column: CategoricalColumn) -> &'static str {
        match column {
            CategoricalColumn::Gender => self.gender.label(),
            CategoricalColumn::Married => self.married.label(),
            CategoricalColumn::Education => self.education.label(),
            CategoricalColumn::SelfEmployed => self.self_employed.label(),
            CategoricalColumn::PropertyArea => self.property_area.label(),
        }
    }

    /// Value of a column that needs no encoding; `None` for categorical columns.
    pub fn numeric(&self, column: FeatureColumn) -> Option<f64> {
        let value = match column {
            FeatureColumn::Dependents => f64::from(self.dependents),
            FeatureColumn::ApplicantIncome => self.applicant_income,
            FeatureColumn::CoapplicantIncome => self.coapplicant_income,
            FeatureColumn::LoanAmount => self.loan_amount,
            FeatureColumn::LoanAmountTerm => self.loan_amount_term,
            FeatureColumn::CreditHistory => self.credit_history,
            FeatureColumn::TotalIncome => self.total_income,
            FeatureColumn::LoanIncomeRatio => self.loan_income_ratio,
            FeatureColumn::HasDependents => f64::from(self.has_dependents),
            FeatureColumn::LoanAmountLog => self.loan_amount_log,
            FeatureColumn::TotalIncomeLog => self.total_income_log,
            FeatureColumn::Gender
            | FeatureColumn::Married
            | FeatureColumn::Education
            | FeatureColumn::SelfEmployed
            | FeatureColumn::PropertyArea => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::approval::domain::{CreditHistory, Dependents};

    fn application(applicant: f64, coapplicant: f64, loan: f64) -> RawApplication {
        RawApplication {
            loan_id: String::new(),
            gender: Gender::Female,
            married: YesNo::Yes,
            dependents: Dependents::One,
            education: Education::Graduate,
            self_employed: YesNo::No,
            applicant_income: applicant,
            coapplicant_income: coapplicant,
            loan_amount: loan,
            loan_amount_term: 360.0,
            credit_history: CreditHistory::MeetsGuidelines,
            property_area: PropertyArea::Rural,
        }
    }

    #[test]
    fn total_income_is_the_exact_sum() {
        let features = FeatureVector::derive(&application(4583.0, 1508.0, 128.0));
        assert_eq!(features.total_income, 4583.0 + 1508.0);
    }

    #[test]
    fn ratio_uses_epsilon_guard() {
        let features = FeatureVector::derive(&application(3000.0, 0.0, 66.0));
        assert_eq!(features.loan_income_ratio, 66.0 / (3000.0 + RATIO_EPSILON));

        let empty = FeatureVector::derive(&application(0.0, 0.0, 0.0));
        assert_eq!(empty.loan_income_ratio, 0.0);
        assert!(empty.loan_income_ratio.is_finite());
    }

    #[test]
    fn zero_income_with_loan_stays_finite() {
        let features = FeatureVector::derive(&application(0.0, 0.0, 100.0));
        assert_eq!(features.loan_income_ratio, 100.0 / RATIO_EPSILON);
    }

    #[test]
    fn log_features_use_log1p_form() {
        let features = FeatureVector::derive(&application(5000.0, 0.0, 150.0));
        assert_eq!(features.loan_amount_log, (151.0_f64).ln());
        assert_eq!(features.total_income_log, (5001.0_f64).ln());

        let zero = FeatureVector::derive(&application(5000.0, 0.0, 0.0));
        assert_eq!(zero.loan_amount_log, 0.0);
    }

    #[test]
    fn has_dependents_tracks_mapped_count() {
        let mut raw = application(5000.0, 0.0, 150.0);

        raw.dependents = Dependents::Zero;
        let none = FeatureVector::derive(&raw);
        assert_eq!((none.dependents, none.has_dependents), (0, 0));

        raw.dependents = Dependents::ThreeOrMore;
        let many = FeatureVector::derive(&raw);
        assert_eq!((many.dependents, many.has_dependents), (3, 1));
    }

    #[test]
    fn categorical_columns_have_no_numeric_value() {
        let features = FeatureVector::derive(&application(5000.0, 0.0, 150.0));
        for column in CategoricalColumn::ALL {
            assert!(features.numeric(column.feature()).is_none());
        }
        assert_eq!(features.numeric(FeatureColumn::CreditHistory), Some(1.0));
        assert_eq!(features.category(CategoricalColumn::PropertyArea), "Rural");
    }

    #[test]
    fn column_names_resolve_back() {
        for column in FeatureColumn::TRAINING_ORDER {
            assert_eq!(FeatureColumn::from_name(column.name()), Some(column));
        }
        assert_eq!(FeatureColumn::from_name("Loan_Status"), None);
        assert_eq!(
            CategoricalColumn::from_name("Self_Employed"),
            Some(CategoricalColumn::SelfEmployed)
        );
        assert_eq!(CategoricalColumn::from_name("Dependents"), None);
    }
}
