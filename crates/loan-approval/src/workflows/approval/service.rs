use std::sync::Arc;

use tracing::{debug, info, warn};

use super::adapter::{self, AlignmentError};
use super::artifacts::{ArtifactBundle, EncodingError, PredictorError};
use super::domain::{NumericDomainError, RawApplication};
use super::features::FeatureVector;
use super::predictor::{self, PredictionResult};

/// Stateless pipeline over the shared, read-only artifacts.
#[derive(Debug, Clone)]
pub struct LoanApprovalPipeline {
    artifacts: Arc<ArtifactBundle>,
}

impl LoanApprovalPipeline {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Validate, derive, encode, scale and classify one application.
    pub fn evaluate(
        &self,
        application: &RawApplication,
    ) -> Result<PredictionResult, PipelineError> {
        let loan_id = application.loan_id.as_str();

        application.validate()?;

        let features = FeatureVector::derive(application);
        debug!(
            loan_id,
            total_income = features.total_income,
            loan_income_ratio = features.loan_income_ratio,
            "derived features"
        );

        let encoded = adapter::encode(&features, self.artifacts.encoders()).inspect_err(|err| {
            warn!(
                loan_id,
                column = %err.column,
                value = %err.value,
                "category outside trained vocabulary"
            );
        })?;

        let scaled = adapter::scale(&encoded, self.artifacts.scaler())?;
        debug!(loan_id, columns = scaled.columns().len(), "scaled feature vector");

        let result = predictor::predict(self.artifacts.classifier(), &scaled)?;
        info!(
            loan_id,
            decision = result.decision.label(),
            approval_probability = result.approval_probability,
            "loan application evaluated"
        );

        Ok(result)
    }

    /// Evaluate every application independently; one failure does not stop the rest.
    pub fn evaluate_all<'a, I>(
        &self,
        applications: I,
    ) -> Vec<Result<PredictionResult, PipelineError>>
    where
        I: IntoIterator<Item = &'a RawApplication>,
    {
        applications
            .into_iter()
            .map(|application| self.evaluate(application))
            .collect()
    }
}

/// Failure while evaluating a single application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] NumericDomainError),
    #[error("unsupported category: {0}")]
    Encoding(#[from] EncodingError),
    #[error("feature alignment failed: {0}")]
    Alignment(#[from] AlignmentError),
    #[error("prediction failed: {0}")]
    Predictor(#[from] PredictorError),
}

impl PipelineError {
    /// Input problems the submitter can fix, as opposed to artifact/pipeline mismatches.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput(_) | PipelineError::Encoding(_)
        )
    }
}
