//! Response header filtering.
//!
//! # Responsibilities
//! - Drop headers that stop proxied content from rendering inside the proxy's origin/frame
//! - Drop cookies (no cross-origin cookie translation)
//! - Strip hop-by-hop headers before the body is re-framed for the client
//!
//! # Design Decisions
//! - Deny-list, allow by default: caching and content headers pass through
//! - Filtering is a pure function over a header map

use axum::http::{header, HeaderMap, HeaderName};

/// Headers removed from every proxied response.
pub const BLOCKED_RESPONSE_HEADERS: [HeaderName; 5] = [
    header::CONTENT_SECURITY_POLICY,
    header::CONTENT_SECURITY_POLICY_REPORT_ONLY,
    header::X_FRAME_OPTIONS,
    header::X_XSS_PROTECTION,
    header::SET_COOKIE,
];

/// Connection-scoped headers that must not be forwarded.
pub const HOP_BY_HOP_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

/// Remove the framing/embedding blockers and cookies, keep everything else.
pub fn filter_response_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in &BLOCKED_RESPONSE_HEADERS {
        headers.remove(name);
    }
    headers
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn upstream_headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'self'"));
        h.insert(
            header::CONTENT_SECURITY_POLICY_REPORT_ONLY,
            HeaderValue::from_static("default-src 'none'"),
        );
        h.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        h.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
        h.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        h.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        h.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        h.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        h.insert(header::ETAG, HeaderValue::from_static("\"abc\""));
        h
    }

    #[test]
    fn test_filter_removes_exactly_the_blocked_headers() {
        let out = filter_response_headers(upstream_headers());
        for name in &BLOCKED_RESPONSE_HEADERS {
            assert!(out.get(name).is_none(), "{} should be removed", name);
        }
        assert_eq!(out.len(), 4);
        assert_eq!(out[header::CACHE_CONTROL], "max-age=60");
        assert_eq!(out[header::CONTENT_TYPE], "image/png");
        assert_eq!(out[header::CONTENT_LENGTH], "42");
        assert_eq!(out[header::ETAG], "\"abc\"");
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut h = HeaderMap::new();
        h.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        h.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        h.insert("x-trace", HeaderValue::from_static("1"));
        h.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));

        strip_hop_by_hop(&mut h);
        assert_eq!(h.len(), 1);
        assert_eq!(h[header::CONTENT_TYPE], "text/css");
    }
}
