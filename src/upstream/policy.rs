//! Request header allow-list for upstream fetches.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Which client headers are forwarded upstream, and the value sent when the
/// client did not provide one. Anything absent from the table is never
/// forwarded (cookies, authorization, proxy identification...).
#[derive(Debug, Clone)]
pub struct ForwardHeaderPolicy {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl ForwardHeaderPolicy {
    /// Build the policy from the configured `{header: default}` table.
    ///
    /// Entries with an invalid name or default are skipped; config validation
    /// reports them before this point.
    pub fn from_table(table: &BTreeMap<String, String>) -> Self {
        let entries = table
            .iter()
            .filter_map(|(name, default)| {
                let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
                let default = HeaderValue::from_str(default).ok()?;
                Some((name, default))
            })
            .collect();
        Self { entries }
    }

    /// Headers to send upstream for a request carrying `client` headers.
    pub fn apply(&self, client: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(self.entries.len());
        for (name, default) in &self.entries {
            let value = client
                .get(name)
                .filter(|v| !v.is_empty())
                .unwrap_or(default);
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    pub fn header_names(&self) -> impl Iterator<Item = &HeaderName> {
        self.entries.iter().map(|(name, _)| name)
    }
}
