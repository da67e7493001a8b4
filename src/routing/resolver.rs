//! Target resolution.
//!
//! Turns the request-target the proxy received into the absolute URL it
//! forwards to. Rules are tried in a fixed order and the first that applies
//! wins:
//!
//! 1. **Embedded target.** The URL contains `target=`. Everything after the
//!    first occurrence is the target. If it does not parse as an absolute
//!    URL it is percent-decoded once and parsed again. Each decoded query
//!    value has every `?` and `/?` removed, then the query is re-encoded and
//!    the URL rebuilt as `scheme://host[:port]path[?query]`. The fragment
//!    and any userinfo are dropped.
//! 2. **Default backend.** The URL does not contain `http` anywhere. It is
//!    appended to the configured default origin.
//! 3. **Absolute.** Anything else is used as-is.
//!
//! Rule 1 fires even for an absolute URL whose own query happens to carry a
//! `target` parameter.
//!
//! Whatever rule applies, the result must parse as an absolute URL with a
//! host, otherwise resolution fails with [`ProxyError::MalformedTarget`].

use std::fmt;

use url::{form_urlencoded, Url};

use crate::error::{ProxyError, Result};

const TARGET_MARKER: &str = "target=";

/// Absolute URL a request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget(Url);

impl ResolvedTarget {
    fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| ProxyError::malformed(raw, e))?;
        if url.host_str().is_none() {
            return Err(ProxyError::malformed(raw, "missing host"));
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn is_https(&self) -> bool {
        self.0.scheme() == "https"
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Which rule produced a target. Reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Embedded,
    DefaultBackend,
    Absolute,
}

/// Computes the destination URL of a request.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    default_backend: String,
}

impl TargetResolver {
    /// Create a resolver that sends relative paths to `default_backend`.
    pub fn new(default_backend: impl Into<String>) -> Self {
        let default_backend = default_backend.into();
        Self {
            default_backend: default_backend.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a request URL to its destination.
    pub fn resolve(&self, request_url: &str) -> Result<ResolvedTarget> {
        self.resolve_with_rule(request_url).map(|(target, _)| target)
    }

    /// Resolve a request URL and report which rule applied.
    pub fn resolve_with_rule(&self, request_url: &str) -> Result<(ResolvedTarget, Resolution)> {
        if let Some(idx) = request_url.find(TARGET_MARKER) {
            let embedded = &request_url[idx + TARGET_MARKER.len()..];
            let rebuilt = rebuild_embedded(embedded)?;
            return Ok((ResolvedTarget::parse(&rebuilt)?, Resolution::Embedded));
        }

        if !request_url.contains("http") {
            let joined = format!("{}{}", self.default_backend, request_url);
            return Ok((ResolvedTarget::parse(&joined)?, Resolution::DefaultBackend));
        }

        Ok((ResolvedTarget::parse(request_url)?, Resolution::Absolute))
    }
}

fn rebuild_embedded(embedded: &str) -> Result<String> {
    let url = match Url::parse(embedded) {
        Ok(url) => url,
        Err(first) => {
            let decoded = urlencoding::decode(embedded)
                .map_err(|_| ProxyError::malformed(embedded, first))?;
            Url::parse(&decoded).map_err(|e| ProxyError::malformed(embedded, e))?
        }
    };

    let host = url
        .host_str()
        .ok_or_else(|| ProxyError::malformed(embedded, "missing host"))?;

    let query = url.query().map(clean_query).unwrap_or_default();

    let mut rebuilt = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        rebuilt.push(':');
        rebuilt.push_str(&port.to_string());
    }
    rebuilt.push_str(url.path());
    if !query.is_empty() {
        rebuilt.push('?');
        rebuilt.push_str(&query);
    }
    Ok(rebuilt)
}

/// Decode a query, strip `?` and `/?` from every value, and re-encode it.
fn clean_query(query: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        serializer.append_pair(&key, &strip_question_marks(&value));
    }
    serializer.finish()
}

fn strip_question_marks(value: &str) -> String {
    value.replace("/?", "").replace('?', "")
}
