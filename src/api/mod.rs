//! HTTP surface.
//!
//! `app_router()` serves the HTML page at `/` and a small JSON API under
//! `/api/`. Every route except `/health` runs behind the session middleware,
//! which ties each browser to its own prediction history.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, AppServer};
pub use types::{ApiContext, SessionId};
