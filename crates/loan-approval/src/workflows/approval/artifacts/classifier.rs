use serde::{Deserialize, Serialize};

use super::ArtifactError;

/// Fitted binary classifier exported by the training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

/// Raw classifier output: positive-class label and `P(class = 1)` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub positive: bool,
    pub probability: f64,
}

/// The classifier could not score the vector it was handed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictorError {
    #[error("classifier expects {expected} features but received {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("classifier model is malformed: {0}")]
    MalformedModel(String),
    #[error("classifier produced a non-finite probability")]
    NonFiniteScore,
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "logistic_regression",
            Classifier::RandomForest(_) => "random_forest",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::LogisticRegression(model) => model.coefficients.len(),
            Classifier::RandomForest(model) => model.n_features,
        }
    }

    pub fn predict(&self, features: &[f64]) -> Result<ClassScore, PredictorError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(PredictorError::DimensionMismatch {
                expected,
                found: features.len(),
            });
        }

        match self {
            Classifier::LogisticRegression(model) => Ok(model.score(features)),
            Classifier::RandomForest(model) => model.score(features),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Classifier::LogisticRegression(model) => model.validate(),
            Classifier::RandomForest(model) => model.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    fn decision(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(coefficient, value)| coefficient * value)
                .sum::<f64>()
    }

    fn score(&self, features: &[f64]) -> ClassScore {
        let decision = self.decision(features);
        ClassScore {
            positive: decision > 0.0,
            probability: sigmoid(decision),
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.coefficients.is_empty() {
            return Err(ArtifactError::InvalidModel(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::InvalidModel(
                "logistic regression parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}

/// Averaged ensemble of probability trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn score(&self, features: &[f64]) -> Result<ClassScore, PredictorError> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.positive_probability(features)?;
        }
        let probability = total / self.trees.len() as f64;

        Ok(ClassScore {
            positive: probability > 1.0 - probability,
            probability,
        })
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.n_features == 0 {
            return Err(ArtifactError::InvalidModel(
                "random forest declares zero features".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::InvalidModel(
                "random forest has no trees".to_string(),
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|detail| ArtifactError::InvalidModel(format!("tree {index}: {detail}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

/// Split nodes send `x[feature] <= threshold` left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

impl DecisionTree {
    fn positive_probability(&self, features: &[f64]) -> Result<f64, PredictorError> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).copied().ok_or_else(|| {
                        PredictorError::MalformedModel(format!(
                            "split on feature {feature} outside input"
                        ))
                    })?;
                    index = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value[1] / (value[0] + value[1])),
                None => {
                    return Err(PredictorError::MalformedModel(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }
        Err(PredictorError::MalformedModel(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {index} splits on unknown feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {index} has a NaN threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|weight| *weight < 0.0 || !weight.is_finite())
                        || total <= 0.0
                    {
                        return Err(format!("leaf {index} has invalid class weights"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_json() -> &'static str {
        r#"{
            "kind": "random_forest",
            "n_features": 2,
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"value": [30.0, 10.0]},
                    {"value": [5.0, 45.0]}
                ]},
                {"nodes": [
                    {"feature": 1, "threshold": -1.0, "left": 1, "right": 2},
                    {"value": [1.0, 0.0]},
                    {"value": [1.0, 3.0]}
                ]}
            ]
        }"#
    }

    #[test]
    fn logistic_regression_is_sigmoid_of_decision() {
        let model = Classifier::LogisticRegression(LogisticRegression::new(vec![2.0, -1.0], 0.5));

        let score = model.predict(&[1.0, 0.5]).expect("dimensions match");
        let decision: f64 = 0.5 + 2.0 - 0.5;
        assert!(score.positive);
        assert_eq!(score.probability, 1.0 / (1.0 + (-decision).exp()));

        let zero = model.predict(&[-0.25, 0.0]).expect("dimensions match");
        assert!(!zero.positive, "a decision of exactly zero is the negative class");
        assert_eq!(zero.probability, 0.5);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let model = Classifier::LogisticRegression(LogisticRegression::new(vec![1.0; 16], 0.0));

        assert_eq!(
            model.predict(&[0.0; 15]),
            Err(PredictorError::DimensionMismatch {
                expected: 16,
                found: 15,
            })
        );
    }

    #[test]
    fn random_forest_averages_leaf_probabilities() {
        let model: Classifier = serde_json::from_str(forest_json()).expect("forest parses");
        model.validate().expect("forest validates");
        assert_eq!(model.kind(), "random_forest");

        let score = model.predict(&[0.9, 0.0]).expect("dimensions match");
        assert_eq!(score.probability, (0.9 + 0.75) / 2.0);
        assert!(score.positive);

        let low = model.predict(&[0.1, -2.0]).expect("dimensions match");
        assert_eq!(low.probability, 0.125);
        assert!(!low.positive);
    }

    #[test]
    fn backwards_children_are_rejected() {
        let model: Classifier = serde_json::from_str(
            r#"{"kind":"random_forest","n_features":1,"trees":[{"nodes":[
                {"feature":0,"threshold":0.0,"left":0,"right":1},
                {"value":[1.0,1.0]}
            ]}]}"#,
        )
        .expect("forest parses");

        match model.validate() {
            Err(ArtifactError::InvalidModel(detail)) => assert!(detail.contains("invalid child")),
            other => panic!("expected invalid model, got {other:?}"),
        }
    }

    #[test]
    fn empty_logistic_regression_is_rejected() {
        let model = Classifier::LogisticRegression(LogisticRegression::new(Vec::new(), 0.1));
        assert!(matches!(
            model.validate(),
            Err(ArtifactError::InvalidModel(_))
        ));
    }
}
