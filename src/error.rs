//! Request-level error taxonomy.
//!
//! Every failure that can end a proxy request maps onto one variant here, and
//! each variant knows the status code it is reported with. Attribute-level
//! rewrite problems never reach this type: they degrade in place.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors surfaced to the client by the proxy endpoint.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing, malformed, or disallowed-scheme target.
    #[error("{0}")]
    InvalidInput(String),

    /// Network, DNS, TLS or timeout failure while talking to the target.
    #[error("Proxy fetch failed: {message}")]
    UpstreamFetch { target: String, message: String },

    /// The HTML rewriting engine gave up on the document.
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),

    /// The upstream HTTP client could not be constructed.
    #[error("Failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ProxyError::InvalidInput(message.into())
    }

    /// Build an [`ProxyError::UpstreamFetch`], flattening the error's source chain
    /// so the client sees the underlying cause (DNS, refused, TLS...).
    pub fn upstream(target: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        ProxyError::UpstreamFetch {
            target: target.to_string(),
            message: error_chain(err),
        }
    }

    /// The target did not deliver a response within `deadline`.
    pub fn deadline(target: &str, deadline: Duration) -> Self {
        ProxyError::UpstreamFetch {
            target: target.to_string(),
            message: format!("no response within {}s", deadline.as_secs()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamFetch { .. }
            | ProxyError::Rewrite(_)
            | ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Join an error and all of its sources with `": "`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProxyError::invalid_input("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        let err = ProxyError::UpstreamFetch {
            target: "https://example.com".into(),
            message: "dns error".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Proxy fetch failed: dns error");
    }

    #[test]
    fn test_deadline_is_a_fetch_failure() {
        let err = ProxyError::deadline("https://slow.test/", Duration::from_secs(3));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Proxy fetch failed: no response within 3s");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = Outer(io);
        assert_eq!(error_chain(&err), "outer: connection refused");
    }
}
