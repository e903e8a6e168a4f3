//! Application router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layer stack (outermost → innermost):
//! 1. `Cache-Control: no-store` on every response → 2. Extension(ApiContext)
//! → 3. Session cookie → handler

use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the application router.
///
/// Middleware uses `Extension<ApiContext>` (injected outside the session layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn app_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Session-scoped routes: page + JSON API
    let sessioned = Router::new()
        .route("/", get(endpoints::page::show).post(endpoints::page::submit))
        .route("/api/predict", post(endpoints::predict::predict))
        .route("/api/history", get(endpoints::history::list))
        .route("/api/dataset", get(endpoints::dataset::stats))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::session::ensure_session))
        // Extension must be outside the session layer so it can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Health needs no session
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .merge(sessioned)
        .merge(open)
        .fallback(endpoints::not_found)
        // Patient data must never be cached
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
