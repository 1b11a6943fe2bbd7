//! Outbound URL filtering so resolved image URLs cannot turn the relay into an open proxy.

use reqwest::Url;

use crate::foundation::error::{RelayError, RelayResult};

/// Hosts and schemes the fetcher is allowed to contact.
///
/// Host entries match exactly, or as a suffix when written as `*.example.com`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundAllowlist {
    hosts: Vec<String>,
    schemes: Vec<String>,
}

impl Default for OutboundAllowlist {
    fn default() -> Self {
        Self::pixiv()
    }
}

impl OutboundAllowlist {
    /// Empty allowlist accepting only `https`, denying every host.
    pub fn new() -> Self {
        Self {
            hosts: Vec::new(),
            schemes: vec!["https".to_owned()],
        }
    }

    /// The pixiv image and API hosts.
    pub fn pixiv() -> Self {
        Self::new()
            .allow_host("i.pximg.net")
            .allow_host("www.pixiv.net")
    }

    /// Allow a host (or `*.suffix` pattern).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into().to_ascii_lowercase());
        self
    }

    /// Allow an additional scheme, e.g. `http` for local test servers.
    pub fn allow_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into().to_ascii_lowercase());
        self
    }

    /// Parse `url` and check it against the list.
    pub fn check(&self, url: &str) -> RelayResult<Url> {
        let parsed = Url::parse(url)
            .map_err(|e| RelayError::upstream(format!("invalid upstream url '{url}': {e}")))?;

        if !self.schemes.iter().any(|s| s == parsed.scheme()) {
            return Err(RelayError::upstream(format!(
                "url rejected: scheme '{}' not allowed",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| RelayError::upstream(format!("url rejected: '{url}' has no host")))?;
        if !self.hosts.iter().any(|pattern| host_matches(pattern, &host)) {
            return Err(RelayError::upstream(format!(
                "url rejected: host '{host}' not allowed"
            )));
        }

        Ok(parsed)
    }
}

fn host_matches(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(suffix) => host
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.')),
        None => pattern == host,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/allowlist.rs"]
mod tests;
