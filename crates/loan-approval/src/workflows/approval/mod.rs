//! Loan approval prediction: form intake, feature derivation, encoding,
//! scaling and classification against pre-fitted artifacts.

pub mod adapter;
pub mod artifacts;
pub mod batch;
pub mod domain;
pub mod features;
pub mod predictor;
pub mod presenter;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use adapter::{AlignmentError, EncodedVector, ScaledVector};
pub use artifacts::{
    ArtifactBundle, ArtifactError, Classifier, EncoderSet, EncodingError, FeatureScaler,
    LabelEncoder, PredictorError,
};
pub use batch::{score_csv, BatchReport, BatchRow, BatchRowError};
pub use domain::{
    CreditHistory, Dependents, Education, Gender, NumericDomainError, NumericField,
    PropertyArea, RawApplication, YesNo,
};
pub use features::{CategoricalColumn, FeatureColumn, FeatureVector};
pub use predictor::{LoanDecision, PredictionResult};
pub use presenter::{render_page, Banner, BannerTone, PageNotice, PredictionView};
pub use router::approval_router;
pub use service::{LoanApprovalPipeline, PipelineError};
