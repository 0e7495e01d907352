//! Pre-fitted classifier, scaler and encoders, loaded once at startup.
//!
//! Artifacts are JSON exports of the fitted training objects. Loading validates
//! their shape and resolves every name against the columns this pipeline
//! produces; any failure is fatal for the process.

mod classifier;
mod encoder;
mod scaler;

pub use classifier::{
    ClassScore, Classifier, DecisionTree, LogisticRegression, PredictorError, RandomForest,
    TreeNode,
};
pub use encoder::{EncoderSet, EncodingError, LabelEncoder};
pub use scaler::{FeatureScaler, ScalerArtifact};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::features::{CategoricalColumn, FeatureColumn};
use crate::config::ArtifactConfig;

/// Startup failure while reading or validating an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("encoder map has no entry for column {0}")]
    MissingEncoder(CategoricalColumn),
    #[error("encoder for column {0} has an empty vocabulary")]
    EmptyVocabulary(CategoricalColumn),
    #[error("encoder for column {column} lists '{value}' more than once")]
    DuplicateCategory {
        column: CategoricalColumn,
        value: String,
    },
    #[error("scaler lists no feature names")]
    EmptyScaler,
    #[error("scaler expects column '{0}', which the pipeline does not produce")]
    UnknownFeature(String),
    #[error("scaler lists column {0} more than once")]
    DuplicateFeature(FeatureColumn),
    #[error("scaler {parameter} has {found} entries for {expected} features")]
    ScalerShape {
        parameter: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("scaler {parameter} for column {column} is invalid ({value})")]
    InvalidScalerParameter {
        column: FeatureColumn,
        parameter: &'static str,
        value: f64,
    },
    #[error("classifier is invalid: {0}")]
    InvalidModel(String),
}

/// Read-only bundle shared by every pipeline invocation.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    classifier: Classifier,
    scaler: FeatureScaler,
    encoders: EncoderSet,
}

impl ArtifactBundle {
    /// Load all three artifacts from the configured directory.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        info!(dir = %config.dir().display(), "loading model artifacts");

        let classifier: Classifier = read_json(&config.model_path())?;
        let scaler: ScalerArtifact = read_json(&config.scaler_path())?;
        let encoders: HashMap<String, LabelEncoder> = read_json(&config.encoders_path())?;

        let bundle = Self::new(
            classifier,
            FeatureScaler::try_from(scaler)?,
            EncoderSet::from_named(encoders)?,
        )?;

        info!(
            classifier = bundle.classifier.kind(),
            n_features = bundle.classifier.n_features(),
            scaler = bundle.scaler.kind(),
            scaler_columns = bundle.scaler.columns().len(),
            "model artifacts loaded"
        );

        Ok(bundle)
    }

    /// Decode artifacts from in-memory JSON readers.
    pub fn from_readers<M, S, E>(model: M, scaler: S, encoders: E) -> Result<Self, ArtifactError>
    where
        M: Read,
        S: Read,
        E: Read,
    {
        let classifier: Classifier = decode(model, Path::new("<model>"))?;
        let scaler: ScalerArtifact = decode(scaler, Path::new("<scaler>"))?;
        let encoders: HashMap<String, LabelEncoder> = decode(encoders, Path::new("<encoders>"))?;

        Self::new(
            classifier,
            FeatureScaler::try_from(scaler)?,
            EncoderSet::from_named(encoders)?,
        )
    }

    pub fn new(
        classifier: Classifier,
        scaler: FeatureScaler,
        encoders: EncoderSet,
    ) -> Result<Self, ArtifactError> {
        classifier.validate()?;

        if classifier.n_features() != scaler.columns().len() {
            warn!(
                classifier_features = classifier.n_features(),
                scaler_columns = scaler.columns().len(),
                "classifier and scaler disagree on feature count; predictions will fail"
            );
        }

        Ok(Self {
            classifier,
            scaler,
            encoders,
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(BufReader::new(file), path)
}

fn decode<T: DeserializeOwned, R: Read>(reader: R, path: &Path) -> Result<T, ArtifactError> {
    serde_json::from_reader(reader).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
