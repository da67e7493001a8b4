//! Request handling and transformation.
//!
//! # Responsibilities
//! - Capture the incoming request with proxy prefixes stripped from its URL
//!   and header values
//! - Produce a [`ForwardPlan`]: target, sanitized headers and body, the
//!   exact payload handed to the dispatcher
//! - Pick how the body travels: buffered (logged requests) or streamed
//!
//! # Design Decisions
//! - Logging needs the whole body, so a logged request is not forwarded
//!   until its body has been read to the end
//! - Unlogged requests stream straight through; their body is never
//!   inspected or rewritten
//! - The dispatcher only sees a `ForwardPlan` and cannot tell which
//!   strategy built it

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{HeaderMap, HeaderValue, Method, Request};

use crate::error::{ProxyError, Result};
use crate::observability::{LogRecord, RequestLogger};
use crate::routing::{ResolvedTarget, UrlCleaner};
use crate::security::HeaderSanitizer;

/// A request as received, after prefix cleaning.
#[derive(Debug)]
pub struct IncomingRequest {
    pub method: Method,
    /// Request-target as received (origin-form or absolute-form), cleaned.
    pub url: String,
    /// Header values cleaned where they are valid strings.
    pub headers: HeaderMap,
    pub body: Body,
}

impl IncomingRequest {
    /// Take ownership of `request` and strip proxy prefixes from its URL
    /// and every string-valued header.
    pub fn from_request(request: Request<Body>, cleaner: &UrlCleaner) -> Self {
        let (parts, body) = request.into_parts();
        let url = cleaner.clean(&parts.uri.to_string());
        let mut headers = parts.headers;
        clean_header_values(&mut headers, cleaner);

        Self {
            method: parts.method,
            url,
            headers,
            body,
        }
    }
}

fn clean_header_values(headers: &mut HeaderMap, cleaner: &UrlCleaner) {
    for value in headers.values_mut() {
        let Ok(text) = value.to_str() else {
            continue;
        };
        if !cleaner.is_dirty(text) {
            continue;
        }
        if let Ok(cleaned) = HeaderValue::from_str(&cleaner.clean(text)) {
            *value = cleaned;
        }
    }
}

/// Body of a forward plan.
#[derive(Debug)]
pub enum PlanBody {
    /// Fully read (and cleaned, if text).
    Buffered(Bytes),
    /// Passed through untouched. `length` is the exact size when known.
    Streamed { body: Body, length: Option<u64> },
}

/// Everything the dispatcher needs. Immutable once built.
#[derive(Debug)]
pub struct ForwardPlan {
    method: Method,
    target: ResolvedTarget,
    headers: HeaderMap,
    body: PlanBody,
}

impl ForwardPlan {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &PlanBody {
        &self.body
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self.body, PlanBody::Buffered(_))
    }

    pub fn into_parts(self) -> (Method, ResolvedTarget, HeaderMap, PlanBody) {
        (self.method, self.target, self.headers, self.body)
    }
}

/// How a request's body reaches the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// Read the whole body, clean it, log the request, then forward.
    Buffered { max_bytes: usize },
    /// Forward immediately, body streamed as it arrives.
    Streamed,
}

impl BodyStrategy {
    /// Pick the strategy for a cleaned request URL.
    pub fn select(logger: &RequestLogger, url: &str, max_bytes: usize) -> Self {
        if logger.should_log(url) {
            BodyStrategy::Buffered { max_bytes }
        } else {
            BodyStrategy::Streamed
        }
    }

    /// Build the plan for `incoming`.
    ///
    /// The buffered strategy emits exactly one log block before returning.
    pub async fn build_plan(
        self,
        incoming: IncomingRequest,
        target: ResolvedTarget,
        cleaner: &UrlCleaner,
        sanitizer: &HeaderSanitizer,
        logger: &RequestLogger,
    ) -> Result<ForwardPlan> {
        let headers = sanitizer.sanitize(&incoming.headers);

        let body = match self {
            BodyStrategy::Buffered { max_bytes } => {
                let raw = axum::body::to_bytes(incoming.body, max_bytes)
                    .await
                    .map_err(|e| ProxyError::ReadBody(e.to_string()))?;
                let bytes = clean_body(raw, cleaner);

                let record = LogRecord::new(&target, &incoming.method, &incoming.headers, &bytes);
                logger.emit(&record, &headers);

                PlanBody::Buffered(bytes)
            }
            BodyStrategy::Streamed => {
                let length = incoming.body.size_hint().exact();
                PlanBody::Streamed {
                    body: incoming.body,
                    length,
                }
            }
        };

        Ok(ForwardPlan {
            method: incoming.method,
            target,
            headers,
            body,
        })
    }
}

fn clean_body(raw: Bytes, cleaner: &UrlCleaner) -> Bytes {
    match std::str::from_utf8(&raw) {
        Ok(text) if cleaner.is_dirty(text) => Bytes::from(cleaner.clean(text)),
        _ => raw,
    }
}
