//! Response headers added to everything the dev server sends.
//!
//! # Design Decisions
//! - `Cache-Control: no-cache` so a rebuilt bundle or WASM binary is never served stale
//! - `X-Content-Type-Options: nosniff` so `.wasm` is only ever treated as `application/wasm`
//! - Headers set by handlers win (`if_not_present`)

use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::schema::HeadersConfig;

pub fn apply_response_headers<S>(router: Router<S>, config: &HeadersConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let mut router = router;
    if config.no_cache {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ));
    }
    if config.nosniff {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));
    }
    router
}
