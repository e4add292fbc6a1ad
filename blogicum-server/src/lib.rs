//! blogicum-server: HTTP API for a multi-user blog
//!
//! Users publish posts (optionally scheduled, tagged with a category and a
//! location), comment on each other's posts, and browse profile pages.

pub mod auth;
pub mod db;
pub mod http;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
