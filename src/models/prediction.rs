use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk verdict derived from the classifier's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    /// Label 1 is high risk; anything else is low risk.
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Self::HighRisk
        } else {
            Self::LowRisk
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            Self::LowRisk => 0,
            Self::HighRisk => 1,
        }
    }

    /// Text used in the history table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowRisk => "Low Risk",
            Self::HighRisk => "High Risk",
        }
    }

    /// Headline shown under the probability.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::LowRisk => "Low Risk of Stroke!",
            Self::HighRisk => "High Risk of Stroke!",
        }
    }
}

/// Outcome of one successful prediction. Lives for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: RiskLabel,
    /// Positive-class probability in `[0, 1]`.
    pub probability: f64,
}

impl PredictionResult {
    /// `"73.25%"`
    pub fn probability_display(&self) -> String {
        format_percentage(self.probability)
    }

    /// Whole percent for the progress bar, truncated like `int(p * 100)`.
    pub fn progress_percent(&self) -> u8 {
        (self.probability * 100.0).clamp(0.0, 100.0) as u8
    }
}

pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// One row of the session's prediction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Prediction")]
    pub prediction: String,
    #[serde(rename = "Probability")]
    pub probability: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(age: u32, result: &PredictionResult) -> Self {
        Self {
            age,
            prediction: result.label.as_str().to_string(),
            probability: result.probability_display(),
            recorded_at: Utc::now(),
        }
    }
}
