//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_kind: &'static str,
    pub active_sessions: usize,
    pub predictions_served: u64,
}

/// `GET /health`: liveness plus a few counters.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model_kind: ctx.core.classifier().kind(),
        active_sessions: ctx.core.active_sessions(),
        predictions_served: ctx.core.predictions_served(),
    })
}
