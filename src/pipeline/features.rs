//! Feature vector builder.
//!
//! The classifier consumes a plain ordered vector; nothing in the artifact
//! says which slot holds which attribute. `FEATURE_ORDER` pins that order.

use serde::Serialize;

use crate::models::patient::{FormError, PatientForm, PatientRecord};

pub const FEATURE_COUNT: usize = 10;

/// Column order the classifier was trained with.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "ever_married",
    "work_type",
    "Residence_type",
    "avg_glucose_level",
    "bmi",
    "smoking_status",
];

/// Ordered numeric input for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Assemble the vector from an encoded record.
pub fn build(record: &PatientRecord) -> FeatureVector {
    FeatureVector([
        f64::from(record.gender),
        f64::from(record.age),
        f64::from(record.hypertension),
        f64::from(record.heart_disease),
        f64::from(record.ever_married),
        f64::from(record.work_type),
        f64::from(record.residence_type),
        record.avg_glucose_level,
        record.bmi,
        f64::from(record.smoking_status),
    ])
}

/// Validate + encode a raw form, then assemble the vector.
pub fn build_from_form(form: &PatientForm) -> Result<FeatureVector, FormError> {
    form.to_record().map(|record| build(&record))
}
