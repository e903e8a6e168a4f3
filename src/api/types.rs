//! Shared types for the HTTP layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::core_state::CoreState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "stroke_session";

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Session of the current request, injected by the session middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// `Set-Cookie` value issuing this id to the browser.
    pub fn cookie(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.0
        )
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}
