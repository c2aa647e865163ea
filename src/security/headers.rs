//! Cross-origin response headers.
//!
//! The search endpoint is called straight from browsers on the marketing
//! site, so every response (errors and fallbacks included) carries
//! permissive CORS headers, and any `OPTIONS` preflight is answered with
//! `204 No Content`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Attach the CORS headers to every response produced by `router`.
pub fn with_cors<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

/// Preflight handler.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
