//! Proxy prefix stripping.
//!
//! Clients that address the proxy as `http://<proxy_host>?target=<url>` tend
//! to leak that prefix into places other than the request line: `Referer`,
//! `Origin`, form bodies. Forwarding those verbatim double-encodes the proxy
//! into the backend's view of the world, so every occurrence is removed.
//!
//! Matching is literal substring replacement, never anchored.

/// Removes the four proxy prefix forms from arbitrary text.
#[derive(Debug, Clone)]
pub struct UrlCleaner {
    prefixes: [String; 4],
}

impl UrlCleaner {
    /// Build the prefix set for the given proxy `host:port`.
    pub fn new(proxy_host: &str) -> Self {
        Self {
            prefixes: [
                format!("http://{proxy_host}?target="),
                format!("https://{proxy_host}?target="),
                format!("http://{proxy_host}/?target="),
                format!("https://{proxy_host}/?target="),
            ],
        }
    }

    /// The literal prefixes this cleaner strips.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Remove every occurrence of every prefix.
    ///
    /// None of the prefixes is a substring of another, and removal is
    /// repeated until nothing changes, so the output never contains a
    /// prefix even when removing one splices another together.
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let mut next = current.clone();
            for prefix in &self.prefixes {
                if next.contains(prefix.as_str()) {
                    next = next.replace(prefix.as_str(), "");
                }
            }
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// True when `text` contains at least one prefix.
    pub fn is_dirty(&self, text: &str) -> bool {
        self.prefixes.iter().any(|p| text.contains(p.as_str()))
    }
}
