//! Fetched upstream responses and their two body shapes.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use url::Url;

use crate::error::ProxyError;

/// Upstream body chunks, forwarded as they arrive.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// The two ways a body leaves the proxy.
pub enum UpstreamBody {
    /// Decoded document text, to be rewritten.
    Html(String),
    /// Anything else, streamed through untouched.
    Raw(ByteStream),
}

impl std::fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamBody::Html(text) => f.debug_tuple("Html").field(&text.len()).finish(),
            UpstreamBody::Raw(_) => f.write_str("Raw(..)"),
        }
    }
}

/// Status line, headers and final URL of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamParts {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// URL of the resource after redirects.
    pub final_url: Url,
}

/// A response received from the target, consumed exactly once.
#[derive(Debug)]
pub struct UpstreamResponse {
    parts: UpstreamParts,
    inner: reqwest::Response,
}

impl UpstreamResponse {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        let parts = UpstreamParts {
            status: inner.status(),
            headers: inner.headers().clone(),
            final_url: inner.url().clone(),
        };
        Self { parts, inner }
    }

    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    pub fn final_url(&self) -> &Url {
        &self.parts.final_url
    }

    pub fn content_type(&self) -> Option<&str> {
        self.parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Materialize the body in the shape the content type calls for.
    pub async fn into_body(self) -> Result<(UpstreamParts, UpstreamBody), ProxyError> {
        let body = if is_html(self.content_type()) {
            let text = self
                .inner
                .text()
                .await
                .map_err(|e| ProxyError::upstream(self.parts.final_url.as_str(), &e))?;
            UpstreamBody::Html(text)
        } else {
            UpstreamBody::Raw(self.inner.bytes_stream().boxed())
        };

        Ok((self.parts, body))
    }
}

/// HTML is recognised from the content type alone; a missing header means binary.
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
}
