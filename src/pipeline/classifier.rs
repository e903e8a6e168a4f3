//! Model adapter: loads the exported classifier artifact and answers
//! label / probability queries.
//!
//! The artifact is a JSON document produced by the training pipeline:
//!
//! ```json
//! { "format_version": 1,
//!   "feature_names": ["gender", "age", ...],
//!   "classifier": { "kind": "logistic_regression", "intercept": -7.1, "coefficients": [...] } }
//! ```
//!
//! or, for tree ensembles, `{"kind": "random_forest", "trees": [{"nodes": [...]}]}`.
//! Everything is validated once at load so that a loaded model can only fail
//! at inference on bad *input*, never on its own structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::features::{FEATURE_COUNT, FEATURE_ORDER};

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Clamp on the linear predictor before `exp()`, keeps the sigmoid finite.
const LOGIT_CLAMP: f64 = 700.0;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Artifact problems. Always fatal: the service cannot start without a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Per-request inference failures. Recoverable: reported to the user, the
/// service keeps running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Expected {expected} features, got {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("Feature {feature} has unsupported value {value}")]
    UnsupportedValue { feature: String, value: f64 },
    #[error("Model produced an invalid output: {0}")]
    InvalidOutput(String),
}

// ═══════════════════════════════════════════════════════════
// Classifier trait
// ═══════════════════════════════════════════════════════════

/// A pre-trained binary classifier over `FEATURE_ORDER` vectors.
///
/// `predict_label` and `predict_probability` are independent queries; callers
/// must not assume the label is the probability thresholded at 0.5.
pub trait Classifier: Send + Sync {
    /// Short identifier of the model family, for logs and health output.
    fn kind(&self) -> &'static str;

    /// Predicted class: 0 (no stroke) or 1 (stroke).
    fn predict_label(&self, features: &[f64]) -> Result<u8, InferenceError>;

    /// Probability of the positive class, in `[0, 1]`.
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

// ═══════════════════════════════════════════════════════════
// Artifact format
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Column names the model was trained on. Must match `FEATURE_ORDER`.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub classifier: ClassifierSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

/// Flattened tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// `features[feature] <= threshold` goes left, otherwise right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights (counts or fractions) for classes 0 and 1.
    Leaf { class_probabilities: Vec<f64> },
}

impl ModelArtifact {
    /// Structural checks. Every index a traversal can follow is in range, and
    /// children always sit after their parent so traversal terminates.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: SUPPORTED_FORMAT_VERSION,
            });
        }

        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_ORDER.iter().copied()) {
                return Err(ModelError::Invalid(format!(
                    "feature_names {names:?} do not match expected order {FEATURE_ORDER:?}"
                )));
            }
        }

        match &self.classifier {
            ClassifierSpec::LogisticRegression(lr) => lr.validate(),
            ClassifierSpec::RandomForest(rf) => rf.validate(),
        }
    }
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "expected {FEATURE_COUNT} coefficients, found {}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("non-finite logistic weight".into()));
        }
        Ok(())
    }

    fn decision_value(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

impl RandomForest {
    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("random forest has no trees".into()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|reason| ModelError::Invalid(format!("tree {t}: {reason}")))?;
        }
        Ok(())
    }

    /// Mean class-0 / class-1 probabilities over all trees.
    fn class_means(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let mut sums = [0.0f64; 2];
        for tree in &self.trees {
            let leaf = tree.leaf_for(features)?;
            let total: f64 = leaf.iter().sum();
            sums[0] += leaf[0] / total;
            sums[1] += leaf[1] / total;
        }
        let n = self.trees.len() as f64;
        Ok([sums[0] / n, sums[1] / n])
    }
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".into());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {idx} splits on feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf {
                    class_probabilities,
                } => {
                    if class_probabilities.len() != 2 {
                        return Err(format!(
                            "leaf {idx} has {} classes, expected 2",
                            class_probabilities.len()
                        ));
                    }
                    if class_probabilities
                        .iter()
                        .any(|p| !p.is_finite() || *p < 0.0)
                    {
                        return Err(format!("leaf {idx} has negative or non-finite weight"));
                    }
                    if class_probabilities.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {idx} has zero total weight"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, features: &[f64]) -> Result<&[f64], InferenceError> {
        let mut idx = 0;
        // Validated trees reach a leaf in at most `nodes.len()` steps.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf {
                    class_probabilities,
                }) => return Ok(class_probabilities),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => break,
            }
        }
        Err(InferenceError::InvalidOutput(
            "tree traversal did not reach a leaf".into(),
        ))
    }
}

// ═══════════════════════════════════════════════════════════
// Loaded model
// ═══════════════════════════════════════════════════════════

/// A validated artifact ready for inference. Immutable after load, so it can
/// be shared across sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Load and validate the artifact at `path`.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let model = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            kind = model.kind(),
            features = FEATURE_COUNT,
            "Classifier loaded"
        );
        Ok(model)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(text)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    #[cfg(test)]
    pub(crate) fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

/// Reject vectors of the wrong shape or with values the model cannot score.
fn check_input(features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != FEATURE_COUNT {
        return Err(InferenceError::ShapeMismatch {
            expected: FEATURE_COUNT,
            found: features.len(),
        });
    }
    if let Some((idx, value)) = features
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(InferenceError::UnsupportedValue {
            feature: FEATURE_ORDER[idx].to_string(),
            value,
        });
    }
    Ok(())
}

fn check_probability(p: f64) -> Result<f64, InferenceError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::InvalidOutput(format!(
            "probability {p} outside [0, 1]"
        )))
    }
}

impl Classifier for LoadedModel {
    fn kind(&self) -> &'static str {
        match &self.artifact.classifier {
            ClassifierSpec::LogisticRegression(_) => "logistic_regression",
            ClassifierSpec::RandomForest(_) => "random_forest",
        }
    }

    fn predict_label(&self, features: &[f64]) -> Result<u8, InferenceError> {
        check_input(features)?;
        match &self.artifact.classifier {
            ClassifierSpec::LogisticRegression(lr) => {
                Ok(u8::from(lr.decision_value(features) > 0.0))
            }
            ClassifierSpec::RandomForest(rf) => {
                let [p0, p1] = rf.class_means(features)?;
                // argmax, ties go to class 0
                Ok(u8::from(p1 > p0))
            }
        }
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_input(features)?;
        let p = match &self.artifact.classifier {
            ClassifierSpec::LogisticRegression(lr) => {
                let eta = lr.decision_value(features).clamp(-LOGIT_CLAMP, LOGIT_CLAMP);
                1.0 / (1.0 + (-eta).exp())
            }
            ClassifierSpec::RandomForest(rf) => rf.class_means(features)?[1],
        };
        check_probability(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: [f64; FEATURE_COUNT] = [1.0, 45.0, 1.0, 0.0, 1.0, 2.0, 1.0, 150.0, 28.0, 2.0];

    fn logistic(intercept: f64, coefficients: Vec<f64>) -> LoadedModel {
        LoadedModel::from_artifact(ModelArtifact {
            format_version: 1,
            feature_names: None,
            classifier: ClassifierSpec::LogisticRegression(LogisticRegression {
                intercept,
                coefficients,
            }),
        })
        .unwrap()
    }

    fn age_stump(threshold: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    class_probabilities: vec![95.0, 5.0],
                },
                TreeNode::Leaf {
                    class_probabilities: vec![0.3, 0.7],
                },
            ],
        }
    }

    fn forest(trees: Vec<DecisionTree>) -> LoadedModel {
        LoadedModel::from_artifact(ModelArtifact {
            format_version: 1,
            feature_names: Some(FEATURE_ORDER.iter().map(|s| s.to_string()).collect()),
            classifier: ClassifierSpec::RandomForest(RandomForest { trees }),
        })
        .unwrap()
    }

    #[test]
    fn logistic_zero_weights_gives_half() {
        let model = logistic(0.0, vec![0.0; FEATURE_COUNT]);
        let p = model.predict_probability(&SCENARIO).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
        // decision value 0 is not > 0
        assert_eq!(model.predict_label(&SCENARIO).unwrap(), 0);
    }

    #[test]
    fn logistic_age_weight_pushes_towards_high_risk() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[1] = 0.1;
        let model = logistic(-4.0, weights);
        // eta = -4 + 4.5 = 0.5
        let p = model.predict_probability(&SCENARIO).unwrap();
        assert!((p - 1.0 / (1.0 + (-0.5f64).exp())).abs() < 1e-12);
        assert_eq!(model.predict_label(&SCENARIO).unwrap(), 1);
    }

    #[test]
    fn logistic_extreme_values_stay_in_unit_interval() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[7] = 1e6;
        let model = logistic(0.0, weights);
        let p = model.predict_probability(&SCENARIO).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn predictions_are_deterministic() {
        let model = forest(vec![age_stump(50.0), age_stump(40.0), age_stump(30.0)]);
        let first = (
            model.predict_label(&SCENARIO).unwrap(),
            model.predict_probability(&SCENARIO).unwrap(),
        );
        for _ in 0..10 {
            assert_eq!(model.predict_label(&SCENARIO).unwrap(), first.0);
            assert_eq!(model.predict_probability(&SCENARIO).unwrap(), first.1);
        }
    }

    #[test]
    fn forest_averages_normalised_leaves() {
        // age 45: tree(50) goes left -> 0.05, trees (40) and (30) go right -> 0.7
        let model = forest(vec![age_stump(50.0), age_stump(40.0), age_stump(30.0)]);
        let p = model.predict_probability(&SCENARIO).unwrap();
        assert!((p - (0.05 + 0.7 + 0.7) / 3.0).abs() < 1e-12);
        assert_eq!(model.predict_label(&SCENARIO).unwrap(), 1);
    }

    #[test]
    fn forest_split_is_inclusive_on_threshold() {
        let model = forest(vec![age_stump(45.0)]);
        let p = model.predict_probability(&SCENARIO).unwrap();
        assert!((p - 0.05).abs() < 1e-12);
        assert_eq!(model.predict_label(&SCENARIO).unwrap(), 0);
    }

    #[test]
    fn forest_tie_goes_to_class_zero() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Leaf {
                class_probabilities: vec![1.0, 1.0],
            }],
        };
        let model = forest(vec![tree]);
        assert_eq!(model.predict_probability(&SCENARIO).unwrap(), 0.5);
        assert_eq!(model.predict_label(&SCENARIO).unwrap(), 0);
    }

    #[test]
    fn probability_in_unit_interval_for_sampled_inputs() {
        let model = forest(vec![age_stump(50.0), age_stump(70.0)]);
        let mut weights = vec![0.01; FEATURE_COUNT];
        weights[7] = 0.02;
        let lr = logistic(-6.0, weights);
        for age in (0..=120).step_by(10) {
            for glucose in [50.0, 120.0, 300.0] {
                let mut x = SCENARIO;
                x[1] = f64::from(age);
                x[7] = glucose;
                for m in [&model as &dyn Classifier, &lr] {
                    let p = m.predict_probability(&x).unwrap();
                    assert!((0.0..=1.0).contains(&p), "{} gave {p}", m.kind());
                }
            }
        }
    }

    #[test]
    fn short_vector_is_shape_mismatch() {
        let model = logistic(0.0, vec![0.0; FEATURE_COUNT]);
        assert_eq!(
            model.predict_label(&SCENARIO[..9]).unwrap_err(),
            InferenceError::ShapeMismatch {
                expected: 10,
                found: 9
            }
        );
        assert!(model.predict_probability(&[]).is_err());
    }

    #[test]
    fn nan_feature_is_unsupported() {
        let model = forest(vec![age_stump(50.0)]);
        let mut x = SCENARIO;
        x[8] = f64::NAN;
        match model.predict_probability(&x).unwrap_err() {
            InferenceError::UnsupportedValue { feature, .. } => assert_eq!(feature, "bmi"),
            other => panic!("Expected UnsupportedValue, got: {other}"),
        }
    }

    #[test]
    fn artifact_json_round_trip() {
        let json = r#"{
            "format_version": 1,
            "classifier": {
                "kind": "random_forest",
                "trees": [{ "nodes": [
                    { "split": { "feature": 1, "threshold": 60.5, "left": 1, "right": 2 } },
                    { "leaf": { "class_probabilities": [0.9, 0.1] } },
                    { "leaf": { "class_probabilities": [0.4, 0.6] } }
                ]}]
            }
        }"#;
        let model = LoadedModel::from_json(json).unwrap();
        assert_eq!(model.kind(), "random_forest");
        assert!((model.predict_probability(&SCENARIO).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn wrong_coefficient_count_is_invalid() {
        let json = r#"{"format_version": 1, "classifier":
            {"kind": "logistic_regression", "intercept": 0.0, "coefficients": [1.0, 2.0]}}"#;
        assert!(matches!(
            LoadedModel::from_json(json),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let json = r#"{"format_version": 7, "classifier":
            {"kind": "logistic_regression", "intercept": 0.0,
             "coefficients": [0,0,0,0,0,0,0,0,0,0]}}"#;
        assert!(matches!(
            LoadedModel::from_json(json),
            Err(ModelError::UnsupportedVersion { found: 7, .. })
        ));
    }

    #[test]
    fn reordered_feature_names_are_rejected() {
        let mut names: Vec<String> = FEATURE_ORDER.iter().map(|s| s.to_string()).collect();
        names.swap(0, 1);
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: Some(names),
            classifier: ClassifierSpec::LogisticRegression(LogisticRegression {
                intercept: 0.0,
                coefficients: vec![0.0; FEATURE_COUNT],
            }),
        };
        assert!(matches!(
            LoadedModel::from_artifact(artifact),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn backward_child_reference_is_rejected() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Leaf {
                    class_probabilities: vec![1.0, 0.0],
                },
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 0,
                    right: 0,
                },
            ],
        };
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: None,
            classifier: ClassifierSpec::RandomForest(RandomForest { trees: vec![tree] }),
        };
        assert!(LoadedModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn out_of_range_feature_index_is_rejected() {
        let mut tree = age_stump(50.0);
        tree.nodes[0] = TreeNode::Split {
            feature: 10,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: None,
            classifier: ClassifierSpec::RandomForest(RandomForest { trees: vec![tree] }),
        };
        assert!(LoadedModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn empty_forest_is_rejected() {
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: None,
            classifier: ClassifierSpec::RandomForest(RandomForest { trees: vec![] }),
        };
        assert!(LoadedModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        match LoadedModel::load(&path).unwrap_err() {
            ModelError::NotFound(p) => assert_eq!(p, path),
            other => panic!("Expected NotFound, got: {other}"),
        }
    }

    #[test]
    fn load_corrupt_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95 pickled bytes").unwrap();
        assert!(LoadedModel::load(file.path()).is_err());
    }

    #[test]
    fn load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let artifact = ModelArtifact {
            format_version: 1,
            feature_names: None,
            classifier: ClassifierSpec::LogisticRegression(LogisticRegression {
                intercept: -1.0,
                coefficients: vec![0.0; FEATURE_COUNT],
            }),
        };
        file.write_all(serde_json::to_string(&artifact).unwrap().as_bytes())
            .unwrap();
        let model = LoadedModel::load(file.path()).unwrap();
        assert_eq!(model.artifact(), &artifact);
        assert_eq!(model.kind(), "logistic_regression");
    }
}
