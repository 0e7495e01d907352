use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ArtifactError;
use crate::workflows::approval::features::CategoricalColumn;

/// Fitted label encoder: a category's code is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|class| class == value)
    }

    fn validate(&self, column: CategoricalColumn) -> Result<(), ArtifactError> {
        if self.classes.is_empty() {
            return Err(ArtifactError::EmptyVocabulary(column));
        }

        let mut seen = BTreeSet::new();
        for class in &self.classes {
            if !seen.insert(class.as_str()) {
                return Err(ArtifactError::DuplicateCategory {
                    column,
                    value: class.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Category value the fitted encoder never saw during training.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{column} value '{value}' is not in the trained vocabulary ({})", .known.join(", "))]
pub struct EncodingError {
    pub column: CategoricalColumn,
    pub value: String,
    pub known: Vec<String>,
}

/// One validated encoder per categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    gender: LabelEncoder,
    married: LabelEncoder,
    education: LabelEncoder,
    self_employed: LabelEncoder,
    property_area: LabelEncoder,
}

impl EncoderSet {
    /// Resolve the exported column-name map, failing if any categorical column is absent.
    pub fn from_named(mut named: HashMap<String, LabelEncoder>) -> Result<Self, ArtifactError> {
        let mut take = |column: CategoricalColumn| -> Result<LabelEncoder, ArtifactError> {
            let encoder = named
                .remove(column.name())
                .ok_or(ArtifactError::MissingEncoder(column))?;
            encoder.validate(column)?;
            Ok(encoder)
        };

        let set = Self {
            gender: take(CategoricalColumn::Gender)?,
            married: take(CategoricalColumn::Married)?,
            education: take(CategoricalColumn::Education)?,
            self_employed: take(CategoricalColumn::SelfEmployed)?,
            property_area: take(CategoricalColumn::PropertyArea)?,
        };

        for extra in named.keys() {
            debug!(column = %extra, "ignoring encoder for column outside the feature set");
        }

        Ok(set)
    }

    pub fn encoder(&self, column: CategoricalColumn) -> &LabelEncoder {
        match column {
            CategoricalColumn::Gender => &self.gender,
            CategoricalColumn::Married => &self.married,
            CategoricalColumn::Education => &self.education,
            CategoricalColumn::SelfEmployed => &self.self_employed,
            CategoricalColumn::PropertyArea => &self.property_area,
        }
    }

    pub fn encode(&self, column: CategoricalColumn, value: &str) -> Result<f64, EncodingError> {
        let encoder = self.encoder(column);
        encoder
            .transform(value)
            .map(|code| code as f64)
            .ok_or_else(|| EncodingError {
                column,
                value: value.to_string(),
                known: encoder.classes().to_vec(),
            })
    }
}
