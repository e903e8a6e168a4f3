//! Submission processor.
//!
//! Single entry point that drives one form submission:
//! encode → predict → (record history + comparison) or failure.
//!
//! Takes the classifier as a trait object so the processor stays testable
//! with stub classifiers.

use serde::Serialize;

use crate::models::patient::{FormError, PatientForm};
use crate::models::prediction::{HistoryEntry, PredictionResult, RiskLabel};
use crate::pipeline::classifier::{Classifier, InferenceError};
use crate::pipeline::features;
use crate::pipeline::reference::{ComparisonRow, ReferenceStats};
use crate::session_cache::SessionHistory;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a submission produced no result. Scoped to that one submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Form(#[from] FormError),
    #[error("{0}")]
    Inference(#[from] InferenceError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Everything rendered after a successful prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub result: PredictionResult,
    pub comparison: Vec<ComparisonRow>,
    /// Session history after this prediction was appended.
    pub history: Vec<HistoryEntry>,
}

/// Terminal state of one submission. There is no partial success.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(PredictionReport),
    Failure(SubmissionError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Query the classifier for one vector.
///
/// Label and probability are two separate calls; no agreement between them
/// is assumed or enforced.
pub fn predict(
    classifier: &dyn Classifier,
    vector: &[f64],
) -> Result<PredictionResult, InferenceError> {
    let class = classifier.predict_label(vector)?;
    let probability = classifier.predict_probability(vector)?;
    Ok(PredictionResult {
        label: RiskLabel::from_class(class),
        probability,
    })
}

/// Run one submission against a session's history.
///
/// On failure the history is left exactly as it was.
pub fn process_submission(
    classifier: &dyn Classifier,
    reference: &ReferenceStats,
    history: &mut SessionHistory,
    form: &PatientForm,
) -> Outcome {
    let vector = match features::build_from_form(form) {
        Ok(vector) => vector,
        Err(e) => {
            tracing::debug!(error = %e, "Submission rejected at encoding");
            return Outcome::Failure(e.into());
        }
    };
    process_raw(classifier, reference, history, form, vector.as_slice())
}

/// Prediction stage. History is only appended once both queries succeed.
fn process_raw(
    classifier: &dyn Classifier,
    reference: &ReferenceStats,
    history: &mut SessionHistory,
    form: &PatientForm,
    vector: &[f64],
) -> Outcome {
    let result = match predict(classifier, vector) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, model = classifier.kind(), "Prediction failed");
            return Outcome::Failure(e.into());
        }
    };

    history.append(HistoryEntry::new(form.age, &result));

    tracing::debug!(
        label = result.label.as_str(),
        probability = result.probability,
        "Prediction recorded"
    );

    Outcome::Success(PredictionReport {
        result,
        comparison: reference.compare(form),
        history: history.all().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed answers, counting calls.
    struct StubClassifier {
        label: u8,
        probability: f64,
        label_calls: AtomicUsize,
        proba_calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(label: u8, probability: f64) -> Self {
            Self {
                label,
                probability,
                label_calls: AtomicUsize::new(0),
                proba_calls: AtomicUsize::new(0),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn kind(&self) -> &'static str {
            "stub"
        }

        fn predict_label(&self, vector: &[f64]) -> Result<u8, InferenceError> {
            self.label_calls.fetch_add(1, Ordering::SeqCst);
            if vector.len() != features::FEATURE_COUNT {
                return Err(InferenceError::ShapeMismatch {
                    expected: features::FEATURE_COUNT,
                    found: vector.len(),
                });
            }
            Ok(self.label)
        }

        fn predict_probability(&self, _vector: &[f64]) -> Result<f64, InferenceError> {
            self.proba_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probability)
        }
    }

    /// Label succeeds, probability blows up.
    struct BrokenProbability;

    impl Classifier for BrokenProbability {
        fn kind(&self) -> &'static str {
            "broken"
        }

        fn predict_label(&self, _vector: &[f64]) -> Result<u8, InferenceError> {
            Ok(1)
        }

        fn predict_probability(&self, _vector: &[f64]) -> Result<f64, InferenceError> {
            Err(InferenceError::InvalidOutput("internal model error".into()))
        }
    }

    fn reference() -> ReferenceStats {
        ReferenceStats {
            total_records: 100,
            stroke_cases: 5,
            mean_bmi: Some(28.9),
            mean_avg_glucose_level: Some(106.1),
            mean_age: Some(43.2),
        }
    }

    #[test]
    fn success_appends_exactly_one_entry() {
        let classifier = StubClassifier::new(1, 0.7325);
        let mut history = SessionHistory::new(None);
        let form = PatientForm {
            age: 45,
            ..PatientForm::default()
        };

        let outcome = process_submission(&classifier, &reference(), &mut history, &form);

        let report = match outcome {
            Outcome::Success(report) => report,
            Outcome::Failure(e) => panic!("Expected success, got: {e}"),
        };
        assert_eq!(history.len(), 1);
        assert_eq!(report.history.len(), 1);
        let entry = &history.all()[0];
        assert_eq!(entry.age, 45);
        assert_eq!(entry.prediction, "High Risk");
        assert_eq!(entry.probability, "73.25%");
        assert_eq!(report.result.label, RiskLabel::HighRisk);
        assert_eq!(report.comparison.len(), 3);
    }

    #[test]
    fn label_and_probability_are_separate_queries() {
        let classifier = StubClassifier::new(0, 0.9);
        let mut history = SessionHistory::new(None);

        let outcome =
            process_submission(&classifier, &reference(), &mut history, &PatientForm::default());

        assert!(outcome.is_success());
        assert_eq!(classifier.label_calls.load(Ordering::SeqCst), 1);
        assert_eq!(classifier.proba_calls.load(Ordering::SeqCst), 1);
        // The verdict follows the label even when the probability disagrees.
        assert_eq!(history.all()[0].prediction, "Low Risk");
        assert_eq!(history.all()[0].probability, "90.00%");
    }

    #[test]
    fn malformed_vector_appends_nothing() {
        let classifier = StubClassifier::new(1, 0.5);
        let mut history = SessionHistory::new(None);
        let form = PatientForm::default();

        let outcome = process_raw(&classifier, &reference(), &mut history, &form, &[1.0, 2.0]);

        match outcome {
            Outcome::Failure(SubmissionError::Inference(InferenceError::ShapeMismatch {
                expected,
                found,
            })) => {
                assert_eq!(expected, 10);
                assert_eq!(found, 2);
            }
            other => panic!("Expected shape mismatch, got: {other:?}"),
        }
        assert!(history.is_empty());
    }

    #[test]
    fn inference_error_leaves_existing_history_intact() {
        let mut history = SessionHistory::new(None);
        let ok = StubClassifier::new(0, 0.1);
        process_submission(&ok, &reference(), &mut history, &PatientForm::default());
        assert_eq!(history.len(), 1);

        let outcome = process_submission(
            &BrokenProbability,
            &reference(),
            &mut history,
            &PatientForm::default(),
        );
        assert!(!outcome.is_success());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn form_error_skips_classifier() {
        let classifier = StubClassifier::new(1, 0.5);
        let mut history = SessionHistory::new(None);
        let form = PatientForm {
            bmi: 75.0,
            ..PatientForm::default()
        };

        let outcome = process_submission(&classifier, &reference(), &mut history, &form);

        assert!(matches!(outcome, Outcome::Failure(SubmissionError::Form(_))));
        assert_eq!(classifier.label_calls.load(Ordering::SeqCst), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn comparison_means_do_not_change_between_submissions() {
        let classifier = StubClassifier::new(0, 0.2);
        let reference = reference();
        let mut history = SessionHistory::new(None);

        let mut averages = Vec::new();
        for age in [20, 50, 80] {
            let form = PatientForm {
                age,
                ..PatientForm::default()
            };
            if let Outcome::Success(report) =
                process_submission(&classifier, &reference, &mut history, &form)
            {
                averages.push(
                    report
                        .comparison
                        .iter()
                        .map(|r| r.dataset_average)
                        .collect::<Vec<_>>(),
                );
            }
        }
        assert_eq!(averages.len(), 3);
        assert!(averages.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn predict_maps_class_to_label() {
        let result = predict(&StubClassifier::new(1, 0.6), &[0.0; 10]).unwrap();
        assert_eq!(result.label, RiskLabel::HighRisk);
        let result = predict(&StubClassifier::new(0, 0.6), &[0.0; 10]).unwrap();
        assert_eq!(result.label, RiskLabel::LowRisk);
    }
}
