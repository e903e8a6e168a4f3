//! The prediction page.
//!
//! - `GET /`: empty form, plus this session's history if it has any
//! - `POST /`: urlencoded form submission, rendered result or inline error

use axum::extract::State;
use axum::response::Html;
use axum::{Extension, Form};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionId};
use crate::pipeline::processor::Outcome;
use crate::ui::{render_page, FormInput, PageView, Panel};

pub async fn show(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let history = ctx.core.history(&session.0)?;
    let form = FormInput::default();
    Ok(Html(render_page(&PageView {
        reference: ctx.core.reference(),
        form: &form,
        panel: Panel::Idle { history: &history },
    })))
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
    Form(input): Form<FormInput>,
) -> Result<Html<String>, ApiError> {
    let outcome = match input.parse() {
        Ok(form) => ctx.core.submit(session.0, &form)?,
        Err(e) => Outcome::Failure(e.into()),
    };

    let panel = match &outcome {
        Outcome::Success(report) => Panel::Report(report),
        Outcome::Failure(err) => Panel::Error(err.to_string()),
    };

    Ok(Html(render_page(&PageView {
        reference: ctx.core.reference(),
        form: &input,
        panel,
    })))
}
