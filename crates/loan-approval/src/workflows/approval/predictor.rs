use serde::{Deserialize, Serialize};

use super::adapter::ScaledVector;
use super::artifacts::{Classifier, PredictorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approved,
    Denied,
}

impl LoanDecision {
    pub const fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "Approved",
            LoanDecision::Denied => "Denied",
        }
    }
}

/// Decision plus the approval probability as a percentage.
///
/// `approval_probability` is always `P(class = 1)`, also for denied loans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub decision: LoanDecision,
    pub approval_probability: f64,
}

impl PredictionResult {
    pub fn is_approved(&self) -> bool {
        self.decision == LoanDecision::Approved
    }

    /// Percentage with exactly two decimals, e.g. `72.31`.
    pub fn probability_display(&self) -> String {
        format!("{:.2}", self.approval_probability)
    }

    /// Percentage rounded to two decimals for machine consumers.
    pub fn rounded_probability(&self) -> f64 {
        (self.approval_probability * 100.0).round() / 100.0
    }
}

pub fn predict(
    classifier: &Classifier,
    scaled: &ScaledVector,
) -> Result<PredictionResult, PredictorError> {
    let score = classifier.predict(scaled.values())?;
    if !score.probability.is_finite() {
        return Err(PredictorError::NonFiniteScore);
    }

    let decision = if score.positive {
        LoanDecision::Approved
    } else {
        LoanDecision::Denied
    };

    Ok(PredictionResult {
        decision,
        approval_probability: (score.probability * 100.0).clamp(0.0, 100.0),
    })
}
