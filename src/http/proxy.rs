//! The proxy endpoint and its convenience redirect.
//!
//! # Data Flow
//! ```text
//! GET <prefix>?url=<target>
//!     → request.rs (extract `url`)
//!     → rewrite::validate_target (400 before any network call)
//!     → upstream::Fetcher (500 on transport failure or missed deadline)
//!     → response.rs (html rewrite | raw stream, upstream status kept)
//! ```

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::http::request::{request_id, target_param};
use crate::http::response::dispatch;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::rewrite::{proxy_url, validate_target};

/// `GET <prefix>?url=...`
pub async fn proxy_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();
    let raw_target = target_param(query.as_deref());

    let target = match validate_target(raw_target.as_deref()) {
        Ok(target) => target,
        Err(e) => {
            let reason = if raw_target.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                "invalid_target"
            } else {
                "missing_target"
            };
            tracing::warn!(
                request_id = %request_id,
                target_url = raw_target.as_deref().unwrap_or(""),
                error = %e,
                "Rejected proxy request"
            );
            metrics::record_rejected(reason);
            return e.into_response();
        }
    };

    tracing::debug!(request_id = %request_id, target_url = %target, "Fetching target");

    let deadline = state.request_timeout;
    let result = tokio::time::timeout(deadline, async {
        let upstream = state.fetcher.fetch(&target, &headers).await?;
        dispatch(upstream, &state.prefix, state.rewrite_options).await
    })
    .await
    .unwrap_or_else(|_| Err(ProxyError::deadline(target.as_str(), deadline)));

    match result {
        Ok((response, kind)) => {
            tracing::info!(
                request_id = %request_id,
                target_url = %target,
                status = response.status().as_u16(),
                kind = kind.as_str(),
                "Proxied"
            );
            metrics::record_request(kind.as_str(), response.status().as_u16(), start);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                target_url = %target,
                error = %e,
                "Proxy error"
            );
            if matches!(e, ProxyError::UpstreamFetch { .. }) {
                metrics::record_upstream_failure();
            }
            metrics::record_request("error", e.status_code().as_u16(), start);
            e.into_response()
        }
    }
}

/// `GET /go?url=...`: 302 to the canonical proxy URL, or to `/` without a target.
pub async fn redirect_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let location = target_param(query.as_deref())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|t| proxy_url(&state.prefix, &t))
        .and_then(|l| HeaderValue::from_str(&l).ok())
        .unwrap_or_else(|| HeaderValue::from_static("/"));

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
