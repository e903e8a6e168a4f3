//! Session cookie middleware.
//!
//! Reads the `stroke_session` cookie, issues a fresh one when it is missing
//! or malformed, sweeps idle sessions, and injects `SessionId` into request
//! extensions for downstream handlers.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionId, SESSION_COOKIE};

/// Resolve the caller's session.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn ensure_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match ensure_session_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn ensure_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let (session, issued) = match session_from_headers(req.headers()) {
        Some(id) => (SessionId(id), false),
        None => (SessionId::new(), true),
    };

    ctx.core.sweep_idle_sessions()?;
    ctx.core.touch(&session.0)?;

    if issued {
        tracing::debug!(session = %session.0, "Issued new session");
    }

    req.extensions_mut().insert(session);
    let mut response = next.run(req).await;

    if issued {
        let cookie = HeaderValue::from_str(&session.cookie())
            .map_err(|e| ApiError::Internal(format!("session cookie: {e}")))?;
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    Ok(response)
}

/// Session id from the `Cookie` header(s), if present and well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
