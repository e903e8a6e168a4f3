//! Comparison dataset: the historical cohort shown next to a prediction.
//!
//! Loaded once at startup; only aggregate statistics are kept.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::patient::PatientForm;

/// Columns the cohort file must provide. Others are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["bmi", "avg_glucose_level", "age", "stroke"];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset is missing required column: {0}")]
    MissingColumn(&'static str),
}

/// One cohort row, reduced to the columns we aggregate.
///
/// Non-numeric cells (`N/A`, empty) deserialize to `None` and are skipped by
/// the means, the same way a dataframe mean skips NaN.
#[derive(Debug, Deserialize)]
struct CohortRow {
    #[serde(deserialize_with = "csv::invalid_option")]
    bmi: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    avg_glucose_level: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    stroke: Option<f64>,
}

/// Aggregates over the cohort. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceStats {
    pub total_records: u64,
    pub stroke_cases: u64,
    pub mean_bmi: Option<f64>,
    pub mean_avg_glucose_level: Option<f64>,
    pub mean_age: Option<f64>,
}

/// One bar pair of the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: &'static str,
    pub your_value: f64,
    pub dataset_average: Option<f64>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

impl ReferenceStats {
    /// Load the cohort CSV at `path`.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }
        let reader = csv::Reader::from_path(path)?;
        let stats = Self::from_csv(reader)?;
        tracing::info!(
            path = %path.display(),
            total = stats.total_records,
            stroke_cases = stats.stroke_cases,
            "Reference dataset loaded"
        );
        Ok(stats)
    }

    /// Aggregate from any CSV source with a header row.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, DatasetError> {
        Self::from_csv(csv::Reader::from_reader(source))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(DatasetError::MissingColumn(column));
            }
        }

        let mut total_records = 0u64;
        let mut stroke_sum = 0.0f64;
        let mut bmi = Mean::default();
        let mut glucose = Mean::default();
        let mut age = Mean::default();

        for row in reader.deserialize::<CohortRow>() {
            let row = row?;
            total_records += 1;
            bmi.add(row.bmi);
            glucose.add(row.avg_glucose_level);
            age.add(row.age);
            stroke_sum += row.stroke.filter(|v| v.is_finite()).unwrap_or(0.0);
        }

        Ok(Self {
            total_records,
            stroke_cases: stroke_sum.round().max(0.0) as u64,
            mean_bmi: bmi.value(),
            mean_avg_glucose_level: glucose.value(),
            mean_age: age.value(),
        })
    }

    /// Patient values next to cohort means: BMI, glucose, age.
    pub fn compare(&self, form: &PatientForm) -> Vec<ComparisonRow> {
        vec![
            ComparisonRow {
                metric: "BMI",
                your_value: form.bmi,
                dataset_average: self.mean_bmi,
            },
            ComparisonRow {
                metric: "Average Glucose Level",
                your_value: form.avg_glucose_level,
                dataset_average: self.mean_avg_glucose_level,
            },
            ComparisonRow {
                metric: "Age",
                your_value: f64::from(form.age),
                dataset_average: self.mean_age,
            },
        ]
    }
}
