//! `POST /api/predict`: score one patient, JSON in and out.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionId};
use crate::models::patient::PatientForm;
use crate::models::prediction::HistoryEntry;
use crate::pipeline::processor::{Outcome, PredictionReport};
use crate::pipeline::reference::ComparisonRow;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Raw class from the classifier: 0 or 1.
    pub label: u8,
    /// `"High Risk"` / `"Low Risk"`
    pub prediction: &'static str,
    pub verdict: &'static str,
    pub probability: f64,
    /// `"73.25%"`
    pub probability_display: String,
    pub comparison: Vec<ComparisonRow>,
    pub history: Vec<HistoryEntry>,
}

impl From<PredictionReport> for PredictResponse {
    fn from(report: PredictionReport) -> Self {
        let result = report.result;
        Self {
            label: result.label.class(),
            prediction: result.label.as_str(),
            verdict: result.label.verdict(),
            probability: result.probability,
            probability_display: result.probability_display(),
            comparison: report.comparison,
            history: report.history,
        }
    }
}

pub async fn predict(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<PatientForm>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match ctx.core.submit(session.0, &form)? {
        Outcome::Success(report) => Ok(Json(report.into())),
        Outcome::Failure(err) => Err(err.into()),
    }
}
