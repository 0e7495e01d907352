use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::workflows::approval::features::FeatureColumn;

/// Scaler as exported by the training job. Parameters are parallel to `feature_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// `x * scale + min`
    MinMax {
        feature_names: Vec<String>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnTransform {
    Standard { mean: f64, scale: f64 },
    MinMax { min: f64, scale: f64 },
}

impl ColumnTransform {
    fn apply(self, value: f64) -> f64 {
        match self {
            ColumnTransform::Standard { mean, scale } => (value - mean) / scale,
            ColumnTransform::MinMax { min, scale } => value * scale + min,
        }
    }
}

/// Fitted per-column affine transform keyed by feature name.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScaler {
    columns: Vec<FeatureColumn>,
    transforms: Vec<ColumnTransform>,
}

impl FeatureScaler {
    /// Columns in the order the scaler was fit on.
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn kind(&self) -> &'static str {
        match self.transforms.first() {
            Some(ColumnTransform::MinMax { .. }) => "min_max",
            _ => "standard",
        }
    }

    /// Transform values already aligned to `columns()`.
    pub(crate) fn apply(&self, aligned: &[f64]) -> Vec<f64> {
        self.transforms
            .iter()
            .zip(aligned)
            .map(|(transform, value)| transform.apply(*value))
            .collect()
    }
}

impl TryFrom<ScalerArtifact> for FeatureScaler {
    type Error = ArtifactError;

    fn try_from(artifact: ScalerArtifact) -> Result<Self, Self::Error> {
        let (feature_names, offsets, scales, offset_name, standard) = match artifact {
            ScalerArtifact::Standard {
                feature_names,
                mean,
                scale,
            } => (feature_names, mean, scale, "mean", true),
            ScalerArtifact::MinMax {
                feature_names,
                min,
                scale,
            } => (feature_names, min, scale, "min", false),
        };

        let columns = resolve_columns(&feature_names)?;
        check_len(offset_name, columns.len(), offsets.len())?;
        check_len("scale", columns.len(), scales.len())?;

        let mut transforms = Vec::with_capacity(columns.len());
        for ((column, offset), scale) in columns.iter().zip(offsets).zip(scales) {
            if !offset.is_finite() {
                return Err(ArtifactError::InvalidScalerParameter {
                    column: *column,
                    parameter: offset_name,
                    value: offset,
                });
            }
            let degenerate = standard && scale == 0.0;
            if !scale.is_finite() || degenerate {
                return Err(ArtifactError::InvalidScalerParameter {
                    column: *column,
                    parameter: "scale",
                    value: scale,
                });
            }
            transforms.push(if standard {
                ColumnTransform::Standard {
                    mean: offset,
                    scale,
                }
            } else {
                ColumnTransform::MinMax { min: offset, scale }
            });
        }

        Ok(Self {
            columns,
            transforms,
        })
    }
}

fn resolve_columns(feature_names: &[String]) -> Result<Vec<FeatureColumn>, ArtifactError> {
    if feature_names.is_empty() {
        return Err(ArtifactError::EmptyScaler);
    }

    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(feature_names.len());
    for name in feature_names {
        let column = FeatureColumn::from_name(name)
            .ok_or_else(|| ArtifactError::UnknownFeature(name.clone()))?;
        if !seen.insert(column) {
            return Err(ArtifactError::DuplicateFeature(column));
        }
        columns.push(column);
    }
    Ok(columns)
}

fn check_len(parameter: &'static str, expected: usize, found: usize) -> Result<(), ArtifactError> {
    if expected == found {
        Ok(())
    } else {
        Err(ArtifactError::ScalerShape {
            parameter,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn standard_scaler_centres_and_divides() {
        let scaler = FeatureScaler::try_from(ScalerArtifact::Standard {
            feature_names: names(&["LoanAmount", "Credit_History"]),
            mean: vec![146.0, 0.84],
            scale: vec![84.0, 0.5],
        })
        .expect("scaler validates");

        assert_eq!(
            scaler.columns(),
            &[FeatureColumn::LoanAmount, FeatureColumn::CreditHistory]
        );
        assert_eq!(scaler.kind(), "standard");
        let scaled = scaler.apply(&[230.0, 1.0]);
        assert_eq!(scaled, vec![1.0, (1.0 - 0.84) / 0.5]);
    }

    #[test]
    fn min_max_scaler_applies_scale_then_offset() {
        let scaler = FeatureScaler::try_from(ScalerArtifact::MinMax {
            feature_names: names(&["Loan_Amount_Term"]),
            min: vec![-0.025],
            scale: vec![0.0025],
        })
        .expect("scaler validates");

        assert_eq!(scaler.kind(), "min_max");
        assert_eq!(scaler.apply(&[410.0]), vec![410.0 * 0.0025 - 0.025]);
    }

    #[test]
    fn unknown_feature_name_is_rejected() {
        let result = FeatureScaler::try_from(ScalerArtifact::Standard {
            feature_names: names(&["LoanAmount", "Loan_Status"]),
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        });

        match result {
            Err(ArtifactError::UnknownFeature(name)) => assert_eq!(name, "Loan_Status"),
            other => panic!("expected unknown feature, got {other:?}"),
        }
    }

    #[test]
    fn parameter_lengths_must_match_names() {
        let result = FeatureScaler::try_from(ScalerArtifact::Standard {
            feature_names: names(&["LoanAmount", "Gender"]),
            mean: vec![0.0],
            scale: vec![1.0, 1.0],
        });

        assert!(matches!(
            result,
            Err(ArtifactError::ScalerShape {
                parameter: "mean",
                expected: 2,
                found: 1,
            })
        ));
    }

    #[test]
    fn zero_standard_scale_is_rejected() {
        let result = FeatureScaler::try_from(ScalerArtifact::Standard {
            feature_names: names(&["Gender"]),
            mean: vec![0.5],
            scale: vec![0.0],
        });

        assert!(matches!(
            result,
            Err(ArtifactError::InvalidScalerParameter {
                column: FeatureColumn::Gender,
                parameter: "scale",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_feature_is_rejected() {
        let result = FeatureScaler::try_from(ScalerArtifact::Standard {
            feature_names: names(&["Gender", "Gender"]),
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        });

        assert!(matches!(
            result,
            Err(ArtifactError::DuplicateFeature(FeatureColumn::Gender))
        ));
    }

    #[test]
    fn artifact_reads_tagged_json() {
        let artifact: ScalerArtifact = serde_json::from_str(
            r#"{"kind":"standard","feature_names":["Gender"],"mean":[0.8],"scale":[0.4]}"#,
        )
        .expect("json parses");

        assert!(matches!(artifact, ScalerArtifact::Standard { .. }));
    }
}
