//! `GET /api/dataset`: reference cohort aggregates.

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::pipeline::reference::ReferenceStats;

pub async fn stats(State(ctx): State<ApiContext>) -> Json<ReferenceStats> {
    Json(ctx.core.reference().clone())
}
