//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4) for tracing
//! - Extract the proxy target from the query string
//!
//! # Design Decisions
//! - Request ID added as early as possible; a client-supplied one is kept
//! - The query string is decoded leniently: a bad escape never turns into
//!   an opaque extractor rejection, the validator reports on what it got

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter holding the target URL.
pub const TARGET_PARAM: &str = "url";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID assigned to a request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// First value of the `url` parameter in a raw query string.
pub fn target_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value.into_owned())
}
