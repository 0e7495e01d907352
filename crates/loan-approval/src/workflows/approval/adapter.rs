use std::collections::BTreeMap;

use super::artifacts::{EncoderSet, EncodingError, FeatureScaler};
use super::features::{CategoricalColumn, FeatureColumn, FeatureVector};

/// Feature values after categorical encoding, keyed by column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    values: BTreeMap<FeatureColumn, f64>,
}

impl EncodedVector {
    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        self.values.get(&column).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn without(mut self, column: FeatureColumn) -> Self {
        self.values.remove(&column);
        self
    }
}

/// Scaled values in the column order the scaler was fit on.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector {
    columns: Vec<FeatureColumn>,
    values: Vec<f64>,
}

impl ScaledVector {
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        self.columns
            .iter()
            .position(|candidate| *candidate == column)
            .map(|index| self.values[index])
    }

    #[cfg(test)]
    pub(crate) fn from_parts(columns: Vec<FeatureColumn>, values: Vec<f64>) -> Self {
        Self { columns, values }
    }
}

/// The scaler expects a column the encoded vector does not carry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scaler expects column {column} but the feature vector has no value for it")]
pub struct AlignmentError {
    pub column: FeatureColumn,
}

/// Replace the five categorical columns with their trained codes.
pub fn encode(
    features: &FeatureVector,
    encoders: &EncoderSet,
) -> Result<EncodedVector, EncodingError> {
    let mut values = BTreeMap::new();

    for column in CategoricalColumn::ALL {
        let code = encoders.encode(column, features.category(column))?;
        values.insert(column.feature(), code);
    }

    for column in FeatureColumn::TRAINING_ORDER {
        if let Some(value) = features.numeric(column) {
            values.insert(column, value);
        }
    }

    Ok(EncodedVector { values })
}

/// Resolve the encoded values to the scaler's columns by name, then scale them.
pub fn scale(
    encoded: &EncodedVector,
    scaler: &FeatureScaler,
) -> Result<ScaledVector, AlignmentError> {
    let aligned = scaler
        .columns()
        .iter()
        .map(|column| {
            encoded
                .get(*column)
                .ok_or(AlignmentError { column: *column })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScaledVector {
        columns: scaler.columns().to_vec(),
        values: scaler.apply(&aligned),
    })
}
