//! Resource fetcher.
//!
//! # Responsibilities
//! - Perform the upstream GET with the allow-listed header set
//! - Follow redirects so the final URL becomes the rewrite base
//! - Collapse every transport failure into a single fetch error
//!
//! # Design Decisions
//! - No retries: the proxy fails fast and lets the client re-request
//! - Finite connect/read timeouts, never an unbounded wait
//! - No content-type decisions here; headers are returned verbatim

use std::time::Duration;

use axum::http::HeaderMap;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::upstream::policy::ForwardHeaderPolicy;
use crate::upstream::response::UpstreamResponse;

/// Shared upstream HTTP client. Cheap to clone; holds no per-request state.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: ForwardHeaderPolicy,
}

impl Fetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(ProxyError::Client)?;

        let policy = ForwardHeaderPolicy::from_table(&config.forward_headers);
        tracing::debug!(
            forwarded = ?policy.header_names().map(|n| n.as_str()).collect::<Vec<_>>(),
            max_redirects = config.max_redirects,
            "Upstream fetcher ready"
        );

        Ok(Self { client, policy })
    }

    /// Fetch `target` on behalf of a client that sent `client_headers`.
    pub async fn fetch(
        &self,
        target: &Url,
        client_headers: &HeaderMap,
    ) -> Result<UpstreamResponse, ProxyError> {
        let headers = self.policy.apply(client_headers);

        let response = self
            .client
            .get(target.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| ProxyError::upstream(target.as_str(), &e))?;

        let upstream = UpstreamResponse::new(response);
        if upstream.final_url() != target {
            tracing::debug!(
                target_url = %target,
                final_url = %upstream.final_url(),
                "Followed redirect"
            );
        }
        tracing::debug!(
            target_url = %target,
            status = upstream.status().as_u16(),
            content_type = upstream.content_type().unwrap_or(""),
            "Upstream responded"
        );

        Ok(upstream)
    }
}
