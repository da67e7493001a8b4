//! Response relay.
//!
//! # Responsibilities
//! - Copy the backend's status code verbatim
//! - Pass backend headers through the response-side deny-list
//! - Stream the body back without touching its bytes
//!
//! # Design Decisions
//! - Headers are re-emitted through a `HeaderMap`, so names reach the client
//!   lowercased regardless of the backend's casing
//! - Framing is left to the proxy's own server (`content-length` and
//!   `transfer-encoding` from the backend are dropped)

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::security::HeaderSanitizer;

/// Turn a backend response into the response for the original client.
pub fn relay_response(upstream: reqwest::Response, sanitizer: &HeaderSanitizer) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    sanitizer.sanitize_response(&mut headers);

    build_relayed(status, headers, Body::from_stream(upstream.bytes_stream()))
}

fn build_relayed(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = (status, body).into_response();
    *response.headers_mut() = headers;
    response
}
