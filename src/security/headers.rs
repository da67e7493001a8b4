//! Header deny-lists.
//!
//! # Responsibilities
//! - Drop headers that go stale once the target and body are rewritten
//!   (`host`, `content-length`); the dispatcher recomputes them
//! - Drop client-tool and proxy artifacts (`postman-token`, `user-agent`,
//!   `vary`) so they never reach the backend
//! - Apply the response-side list before relaying a backend response
//!
//! # Design Decisions
//! - Names compare case-insensitively; `HeaderMap` already stores them
//!   lowercased, the string check covers configured names in any case
//! - `vary` is always dropped from responses, even if the configured
//!   response list leaves it out
//! - Hop-by-hop framing headers never cross the relay

use axum::http::{header, HeaderMap, HeaderName};

use crate::config::HeaderConfig;

/// Framing headers that describe the backend connection, not the response.
const HOP_BY_HOP: &[HeaderName] = &[header::TRANSFER_ENCODING, header::CONNECTION];

/// Removes deny-listed headers in both directions.
#[derive(Debug, Clone)]
pub struct HeaderSanitizer {
    request_deny: Vec<String>,
    response_deny: Vec<String>,
}

impl HeaderSanitizer {
    /// Build from explicit deny-lists.
    pub fn new<I, J, S, T>(request_deny: I, response_deny: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            request_deny: request_deny
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
            response_deny: response_deny
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &HeaderConfig) -> Self {
        Self::new(&config.request_deny_list, &config.response_deny_list)
    }

    /// True if `name` must not be forwarded to the target.
    pub fn is_denied(&self, name: &str) -> bool {
        self.request_deny
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(name))
    }

    /// True if `name` must not be relayed back to the client.
    pub fn is_denied_in_response(&self, name: &str) -> bool {
        self.response_deny
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(name))
    }

    /// Request side: a copy of `headers` without any deny-listed name.
    pub fn sanitize(&self, headers: &HeaderMap) -> HeaderMap {
        let mut out = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            if !self.is_denied(name.as_str()) {
                out.append(name.clone(), value.clone());
            }
        }
        out
    }

    /// Response side, in place.
    pub fn sanitize_response(&self, headers: &mut HeaderMap) {
        headers.remove(header::VARY);
        for name in HOP_BY_HOP {
            headers.remove(name);
        }
        let denied: Vec<HeaderName> = headers
            .keys()
            .filter(|name| self.is_denied_in_response(name.as_str()))
            .cloned()
            .collect();
        for name in denied {
            headers.remove(&name);
        }
    }
}

impl Default for HeaderSanitizer {
    fn default() -> Self {
        Self::from_config(&HeaderConfig::default())
    }
}
