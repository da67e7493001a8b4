//! Request-level errors.
//!
//! Every failure terminates the current request. Nothing is retried and no
//! variant is fatal to the process: the handler logs the cause and answers
//! the client with a plain-text 500.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body sent to the client whenever a request cannot be proxied.
pub const PROXY_ERROR_BODY: &str = "Something went wrong with the proxy server.";

/// Errors raised while resolving, building or dispatching a forwarded request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The URL embedded after `target=` (or the request URL itself) is not
    /// a usable absolute URL.
    #[error("Malformed target '{input}': {reason}")]
    MalformedTarget { input: String, reason: String },

    /// The target could not be reached or the transport failed mid-flight.
    #[error("Dispatch to {target} failed: {source}")]
    Dispatch {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The client's request body could not be read or exceeded the limit.
    #[error("Failed to read request body: {0}")]
    ReadBody(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    pub(crate) fn malformed(input: &str, reason: impl ToString) -> Self {
        ProxyError::MalformedTarget {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Status code sent to the client. Always 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain")],
            PROXY_ERROR_BODY,
        )
            .into_response()
    }
}
