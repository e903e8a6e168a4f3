//! Request middleware.
//!
//! Only one layer: the session middleware, which resolves or issues the
//! session cookie before any page or API handler runs.

pub mod session;
