//! Response dispatch.
//!
//! # Responsibilities
//! - Branch on the upstream content type: rewrite HTML, stream everything else
//! - Filter upstream headers before they reach the client
//! - Mirror the upstream status code on both paths
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - Hop-by-hop headers stripped automatically
//! - A stream that fails mid-body aborts the connection instead of hanging

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::Response,
};

use crate::error::ProxyError;
use crate::rewrite::{rewrite_html, RewriteContext, RewriteOptions};
use crate::security::{filter_response_headers, strip_hop_by_hop};
use crate::upstream::{UpstreamBody, UpstreamResponse};

/// Content type forced on rewritten documents.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Which path a response took, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Html,
    Raw,
}

impl BodyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Html => "html",
            BodyKind::Raw => "raw",
        }
    }
}

/// Turn an upstream response into the client-facing one.
pub async fn dispatch(
    upstream: UpstreamResponse,
    prefix: &str,
    options: RewriteOptions,
) -> Result<(Response, BodyKind), ProxyError> {
    let (parts, body) = upstream.into_body().await?;

    let mut headers = filter_response_headers(parts.headers);
    strip_hop_by_hop(&mut headers);

    let (body, kind) = match body {
        UpstreamBody::Html(text) => {
            let ctx = RewriteContext::new(parts.final_url, prefix);
            let markup = rewrite_html(&text, &ctx, options)?;

            headers.remove(header::CONTENT_LENGTH);
            headers.remove(header::CONTENT_ENCODING);
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(HTML_CONTENT_TYPE),
            );
            (Body::from(markup), BodyKind::Html)
        }
        UpstreamBody::Raw(stream) => (Body::from_stream(stream), BodyKind::Raw),
    };

    let mut response = Response::new(body);
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers;
    Ok((response, kind))
}
