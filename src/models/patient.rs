use serde::{Deserialize, Serialize};

use crate::models::enums::CategoricalField;
use crate::pipeline::encoder::{self, EncodeError};

/// Bounds and default of a numeric form input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

pub const AGE_RANGE: NumericRange = NumericRange {
    min: 0.0,
    max: 120.0,
    default: 30.0,
    step: 1.0,
};

pub const GLUCOSE_RANGE: NumericRange = NumericRange {
    min: 50.0,
    max: 300.0,
    default: 100.0,
    step: 0.01,
};

pub const BMI_RANGE: NumericRange = NumericRange {
    min: 10.0,
    max: 60.0,
    default: 20.0,
    step: 0.01,
};

/// Raw form input, as a user entered it.
///
/// Categorical fields carry the human-readable label; encoding happens in
/// [`PatientForm::to_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub gender: String,
    pub age: u32,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type", alias = "residence_type")]
    pub residence_type: String,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub smoking_status: String,
}

impl Default for PatientForm {
    /// First option of every dropdown and the documented numeric defaults.
    fn default() -> Self {
        Self {
            gender: CategoricalField::Gender.default_label().into(),
            age: AGE_RANGE.default as u32,
            hypertension: 0,
            heart_disease: 0,
            ever_married: CategoricalField::EverMarried.default_label().into(),
            work_type: CategoricalField::WorkType.default_label().into(),
            residence_type: CategoricalField::ResidenceType.default_label().into(),
            avg_glucose_level: GLUCOSE_RANGE.default,
            bmi: BMI_RANGE.default,
            smoking_status: CategoricalField::SmokingStatus.default_label().into(),
        }
    }
}

impl PatientForm {
    /// Check UI-level ranges and encode every categorical label.
    pub fn to_record(&self) -> Result<PatientRecord, FormError> {
        check_range("age", f64::from(self.age), &AGE_RANGE)?;
        check_range("avg_glucose_level", self.avg_glucose_level, &GLUCOSE_RANGE)?;
        check_range("bmi", self.bmi, &BMI_RANGE)?;
        check_flag("hypertension", self.hypertension)?;
        check_flag("heart_disease", self.heart_disease)?;

        Ok(PatientRecord {
            gender: encoder::encode(CategoricalField::Gender, &self.gender)?,
            age: self.age,
            hypertension: self.hypertension,
            heart_disease: self.heart_disease,
            ever_married: encoder::encode(CategoricalField::EverMarried, &self.ever_married)?,
            work_type: encoder::encode(CategoricalField::WorkType, &self.work_type)?,
            residence_type: encoder::encode(CategoricalField::ResidenceType, &self.residence_type)?,
            avg_glucose_level: self.avg_glucose_level,
            bmi: self.bmi,
            smoking_status: encoder::encode(CategoricalField::SmokingStatus, &self.smoking_status)?,
        })
    }
}

fn check_range(field: &'static str, value: f64, range: &NumericRange) -> Result<(), FormError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(FormError::OutOfRange {
            field,
            value,
            min: range.min,
            max: range.max,
        })
    }
}

fn check_flag(field: &'static str, value: u8) -> Result<(), FormError> {
    match value {
        0 | 1 => Ok(()),
        _ => Err(FormError::InvalidFlag { field, value }),
    }
}

/// One patient with every categorical field already encoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientRecord {
    pub gender: u8,
    pub age: u32,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: u8,
    pub work_type: u8,
    pub residence_type: u8,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub smoking_status: u8,
}

/// Input problems caught before the classifier is consulted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be 0 or 1 (got {value})")]
    InvalidFlag { field: &'static str, value: u8 },
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
