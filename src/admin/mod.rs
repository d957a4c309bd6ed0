//! Inspection endpoints.
//!
//! Read-only views of the compiled routing policy, so a running server can be
//! asked how it would treat a path without guessing from config files.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(prefix: &str) -> Router<AppState> {
    let prefix = prefix.trim_end_matches('/');
    Router::new()
        .route(&format!("{prefix}/status"), get(get_status))
        .route(&format!("{prefix}/rules"), get(get_rules))
        .route(&format!("{prefix}/resolve"), get(get_resolve))
}
