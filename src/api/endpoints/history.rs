//! `GET /api/history`: the calling session's prediction history.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionId};
use crate::models::prediction::HistoryEntry;

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = ctx.core.history(&session.0)?;
    Ok(Json(HistoryResponse { history }))
}
