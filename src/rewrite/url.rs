//! Target validation and reference resolution.
//!
//! # Responsibilities
//! - Gate the proxy endpoint: only absolute http(s) targets get fetched
//! - Resolve embedded references against the page's base URL
//! - Build proxy-routed URLs (`<prefix>?url=<encoded absolute URL>`)
//!
//! # Design Decisions
//! - Validation is a security boundary: other schemes are rejected, not dropped
//! - Resolution fails open; one bad attribute never aborts a page rewrite

use url::Url;

use crate::error::ProxyError;

/// Message returned when the `url` parameter is absent or empty.
pub const MISSING_TARGET: &str =
    "Missing url parameter. Use /proxy?url=https://example.com";

/// Message returned for any scheme other than http(s).
pub const UNSUPPORTED_SCHEME: &str = "Only http(s) URLs are supported.";

/// Validate a client-supplied target before anything touches the network.
pub fn validate_target(raw: Option<&str>) -> Result<Url, ProxyError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ProxyError::invalid_input(MISSING_TARGET));
    }
    if !has_http_prefix(raw) {
        return Err(ProxyError::invalid_input(UNSUPPORTED_SCHEME));
    }

    Url::parse(raw).map_err(|e| ProxyError::invalid_input(format!("Invalid target URL: {}", e)))
}

/// Case-insensitive `^https?://` check.
pub fn has_http_prefix(raw: &str) -> bool {
    starts_with_ignore_case(raw, "http://") || starts_with_ignore_case(raw, "https://")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Resolve `relative` against `base`.
///
/// Returns the input unchanged when it cannot be resolved.
pub fn resolve(base: &Url, relative: &str) -> String {
    match base.join(relative) {
        Ok(url) => url.to_string(),
        Err(_) => relative.to_string(),
    }
}

/// A reference consisting only of a fragment never leaves the current page.
pub fn is_fragment_only(reference: &str) -> bool {
    reference.trim_start().starts_with('#')
}

/// Build the proxy-routed form of an absolute URL.
pub fn proxy_url(prefix: &str, absolute: &str) -> String {
    format!("{}?url={}", prefix, urlencoding::encode(absolute))
}

/// Immutable per-request rewrite inputs.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    base: Url,
    prefix: String,
}

impl RewriteContext {
    /// `base` is the final (post-redirect) URL of the fetched document.
    pub fn new(base: Url, prefix: impl Into<String>) -> Self {
        Self {
            base,
            prefix: prefix.into(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Same prefix, different resolution base (used once `<base href>` is seen).
    pub fn with_base(&self, base: Url) -> Self {
        Self {
            base,
            prefix: self.prefix.clone(),
        }
    }

    /// Route one reference through the proxy.
    ///
    /// `None` means "leave the attribute alone": empty values, references that
    /// do not resolve, and anything that is not http(s) once resolved
    /// (`data:`, `mailto:`, `javascript:` ...).
    pub fn rewrite_reference(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        // `resolve` hands back relative input unchanged on failure, which
        // never parses as an absolute URL.
        let absolute = Url::parse(&resolve(&self.base, trimmed)).ok()?;
        match absolute.scheme() {
            "http" | "https" => Some(proxy_url(&self.prefix, absolute.as_str())),
            _ => None,
        }
    }
}
